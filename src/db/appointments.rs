use chrono::Utc;
use serde::Serialize;

use super::{Store, StoreError};
use crate::{
    auth::new_id,
    models::{Appointment, AppointmentStatus},
    validation::NewAppointment,
};

const APPOINTMENT_COLUMNS: &str =
    "id, name, phone, email, service, date, note, status, created_at";

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct AppointmentQuery {
    pub status: AppointmentStatus,
    pub name_prefix: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for AppointmentQuery {
    fn default() -> Self {
        Self {
            status: AppointmentStatus::Pending,
            name_prefix: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppointmentQuery {
    fn page(&self) -> u32 {
        self.page.max(1)
    }

    fn page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// LIKE pattern for the name filter with wildcards in the prefix escaped.
    fn name_pattern(&self) -> String {
        let prefix = self.name_prefix.as_deref().map(str::trim).unwrap_or_default();
        let mut pattern = String::with_capacity(prefix.len() + 1);
        for c in prefix.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppointmentCounts {
    pub total: i64,
    pub pending: i64,
    pub processed: i64,
}

/// Result of asking for a status change.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Applied(Appointment),
    Rejected(AppointmentStatus),
    Missing,
}

impl Store {
    pub async fn create_appointment(&self, new: NewAppointment) -> Result<Appointment, StoreError> {
        let id = new_id();
        sqlx::query_as::<_, Appointment>(&format!(
            r#"INSERT INTO appointments
               (id, name, phone, email, service, date, note, status, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING {APPOINTMENT_COLUMNS}"#
        ))
        .bind(&id)
        .bind(new.name)
        .bind(new.phone)
        .bind(new.email)
        .bind(new.service)
        .bind(new.date)
        .bind(new.note)
        .bind(AppointmentStatus::Pending)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(self.failure("appointments", "create"))
    }

    pub async fn appointment(&self, id: &str) -> Result<Option<Appointment>, StoreError> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ? LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(self.failure(format!("appointments/{id}"), "get"))
    }

    pub async fn list_appointments(
        &self,
        query: &AppointmentQuery,
    ) -> Result<Page<Appointment>, StoreError> {
        let page = query.page();
        let page_size = query.page_size();
        let offset = i64::from(page - 1) * i64::from(page_size);
        let pattern = query.name_pattern();

        let total = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM appointments
               WHERE status = ? AND name LIKE ? ESCAPE '\'"#,
        )
        .bind(query.status)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(self.failure("appointments", "list"))?;

        let items = sqlx::query_as::<_, Appointment>(&format!(
            r#"SELECT {APPOINTMENT_COLUMNS} FROM appointments
               WHERE status = ? AND name LIKE ? ESCAPE '\'
               ORDER BY created_at DESC, id
               LIMIT ? OFFSET ?"#
        ))
        .bind(query.status)
        .bind(&pattern)
        .bind(i64::from(page_size))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(self.failure("appointments", "list"))?;

        let has_next = offset + (items.len() as i64) < total;
        Ok(Page {
            items,
            page,
            page_size,
            total,
            has_next,
            has_prev: page > 1,
        })
    }

    /// Moves a pending appointment to processed. Two admins racing on the
    /// same record cannot both apply it.
    pub async fn mark_processed(&self, id: &str) -> Result<Transition, StoreError> {
        self.transition(id, AppointmentStatus::Processed).await
    }

    /// Applies `next` when the current status allows it. The update is
    /// conditional on the status that was read, so a concurrent change
    /// surfaces as `Rejected` with the status that won.
    async fn transition(&self, id: &str, next: AppointmentStatus) -> Result<Transition, StoreError> {
        let Some(current) = self.appointment(id).await? else {
            return Ok(Transition::Missing);
        };
        if !current.status.can_transition_to(next) {
            return Ok(Transition::Rejected(current.status));
        }

        let updated = sqlx::query_as::<_, Appointment>(&format!(
            r#"UPDATE appointments SET status = ?
               WHERE id = ? AND status = ?
               RETURNING {APPOINTMENT_COLUMNS}"#
        ))
        .bind(next)
        .bind(id)
        .bind(current.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(self.failure(format!("appointments/{id}"), "update"))?;

        if let Some(appointment) = updated {
            return Ok(Transition::Applied(appointment));
        }

        Ok(match self.appointment(id).await? {
            Some(current) => Transition::Rejected(current.status),
            None => Transition::Missing,
        })
    }

    /// Permanently removes an appointment, returning the deleted record.
    pub async fn delete_appointment(&self, id: &str) -> Result<Option<Appointment>, StoreError> {
        sqlx::query_as::<_, Appointment>(&format!(
            "DELETE FROM appointments WHERE id = ? RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(self.failure(format!("appointments/{id}"), "delete"))
    }

    pub async fn appointment_counts(&self) -> Result<AppointmentCounts, StoreError> {
        let rows = sqlx::query_as::<_, (AppointmentStatus, i64)>(
            "SELECT status, COUNT(*) FROM appointments GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(self.failure("appointments", "count"))?;

        let mut counts = AppointmentCounts::default();
        for (status, count) in rows {
            match status {
                AppointmentStatus::Pending => counts.pending = count,
                AppointmentStatus::Processed => counts.processed = count,
            }
            counts.total += count;
        }
        Ok(counts)
    }

    pub async fn recent_appointments(&self, limit: u32) -> Result<Vec<Appointment>, StoreError> {
        sqlx::query_as::<_, Appointment>(&format!(
            r#"SELECT {APPOINTMENT_COLUMNS} FROM appointments
               ORDER BY created_at DESC, id
               LIMIT ?"#
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(self.failure("appointments", "list"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::test_store;

    fn booking(name: &str) -> NewAppointment {
        NewAppointment {
            name: name.to_string(),
            phone: "081234567890".to_string(),
            email: "rina@x.com".to_string(),
            service: "Facial Glow".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            note: None,
        }
    }

    fn tab(status: AppointmentStatus) -> AppointmentQuery {
        AppointmentQuery {
            status,
            ..AppointmentQuery::default()
        }
    }

    #[actix_web::test]
    async fn new_bookings_are_pending_with_a_timestamp() {
        let store = test_store().await;
        let before = Utc::now();
        let created = store.create_appointment(booking("Rina")).await.unwrap();

        assert_eq!(created.status, AppointmentStatus::Pending);
        assert!(created.created_at >= before - chrono::Duration::seconds(1));
        assert_eq!(store.appointment(&created.id).await.unwrap(), Some(created));
    }

    #[actix_web::test]
    async fn processing_moves_record_between_tabs() {
        let store = test_store().await;
        let created = store.create_appointment(booking("Rina")).await.unwrap();

        let Transition::Applied(updated) = store.mark_processed(&created.id).await.unwrap() else {
            panic!("expected the transition to apply");
        };
        assert_eq!(updated.status, AppointmentStatus::Processed);

        let pending = store.list_appointments(&tab(AppointmentStatus::Pending)).await.unwrap();
        let processed = store.list_appointments(&tab(AppointmentStatus::Processed)).await.unwrap();
        assert!(pending.items.is_empty());
        assert_eq!(processed.items.len(), 1);
        assert_eq!(processed.items[0].id, created.id);
    }

    #[actix_web::test]
    async fn processing_is_one_way() {
        let store = test_store().await;
        let created = store.create_appointment(booking("Rina")).await.unwrap();
        store.mark_processed(&created.id).await.unwrap();

        assert_eq!(
            store.mark_processed(&created.id).await.unwrap(),
            Transition::Rejected(AppointmentStatus::Processed)
        );
        assert_eq!(store.mark_processed("missing").await.unwrap(), Transition::Missing);
    }

    #[actix_web::test]
    async fn racing_moderators_apply_the_transition_once() {
        let store = test_store().await;
        let created = store.create_appointment(booking("Rina")).await.unwrap();

        let (a, b) = tokio::join!(
            store.mark_processed(&created.id),
            store.mark_processed(&created.id),
        );
        let outcomes = [a.unwrap(), b.unwrap()];
        let applied = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, Transition::Applied(_)))
            .count();
        assert_eq!(applied, 1);
        assert!(outcomes
            .iter()
            .any(|outcome| *outcome == Transition::Rejected(AppointmentStatus::Processed)));
    }

    #[actix_web::test]
    async fn deleted_records_are_gone_from_every_view() {
        let store = test_store().await;
        let created = store.create_appointment(booking("Rina")).await.unwrap();

        let deleted = store.delete_appointment(&created.id).await.unwrap();
        assert_eq!(deleted.map(|a| a.id), Some(created.id.clone()));
        assert_eq!(store.appointment(&created.id).await.unwrap(), None);
        assert_eq!(store.delete_appointment(&created.id).await.unwrap(), None);

        for status in [AppointmentStatus::Pending, AppointmentStatus::Processed] {
            assert_eq!(store.list_appointments(&tab(status)).await.unwrap().total, 0);
        }
    }

    #[actix_web::test]
    async fn name_prefix_filter_is_case_insensitive_and_literal() {
        let store = test_store().await;
        for name in ["Rina", "rini", "Dewi", "Ri_ko", "Rizal"] {
            store.create_appointment(booking(name)).await.unwrap();
        }

        let query = AppointmentQuery {
            name_prefix: Some("ri".to_string()),
            ..AppointmentQuery::default()
        };
        assert_eq!(store.list_appointments(&query).await.unwrap().total, 4);

        let query = AppointmentQuery {
            name_prefix: Some("Ri_".to_string()),
            ..AppointmentQuery::default()
        };
        let page = store.list_appointments(&query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Ri_ko");
    }

    #[actix_web::test]
    async fn pagination_reports_neighbours() {
        let store = test_store().await;
        for i in 0..5 {
            store.create_appointment(booking(&format!("Klien {i}"))).await.unwrap();
        }

        let first = AppointmentQuery {
            page_size: 2,
            ..AppointmentQuery::default()
        };
        let page = store.list_appointments(&first).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert!(page.has_next);
        assert!(!page.has_prev);

        let last = AppointmentQuery {
            page: 3,
            page_size: 2,
            ..AppointmentQuery::default()
        };
        let page = store.list_appointments(&last).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[actix_web::test]
    async fn counts_split_by_status() {
        let store = test_store().await;
        let a = store.create_appointment(booking("Rina")).await.unwrap();
        store.create_appointment(booking("Dewi")).await.unwrap();
        store.create_appointment(booking("Lina")).await.unwrap();
        store.mark_processed(&a.id).await.unwrap();

        let counts = store.appointment_counts().await.unwrap();
        assert_eq!(
            counts,
            AppointmentCounts {
                total: 3,
                pending: 2,
                processed: 1
            }
        );
        assert_eq!(store.recent_appointments(2).await.unwrap().len(), 2);
    }
}
