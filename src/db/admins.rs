use chrono::Utc;

use super::{Store, StoreError};
use crate::{auth::new_id, models::AdminRow};

impl Store {
    pub async fn admin_exists(&self) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT EXISTS (SELECT 1 FROM admins)")
            .fetch_one(&self.pool)
            .await
            .map(|exists| exists != 0)
            .map_err(self.failure("admins", "get"))
    }

    pub async fn admin_by_email(&self, email: &str) -> Result<Option<AdminRow>, StoreError> {
        sqlx::query_as::<_, AdminRow>(
            r#"SELECT uid, email, password_hash, created_at
               FROM admins
               WHERE email = ?
               LIMIT 1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(self.failure("admins", "get"))
    }

    /// Creates the first admin. Returns `None` when an admin already exists.
    ///
    /// The existence check and the insert are a single statement, and the
    /// `singleton` unique column rejects any second row, so concurrent
    /// first-run registrations cannot both succeed.
    pub async fn register_first_admin(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<AdminRow>, StoreError> {
        let uid = new_id();
        let inserted = sqlx::query_as::<_, AdminRow>(
            r#"INSERT INTO admins (uid, email, password_hash, created_at)
               SELECT ?, ?, ?, ?
               WHERE NOT EXISTS (SELECT 1 FROM admins)
               RETURNING uid, email, password_hash, created_at"#,
        )
        .bind(&uid)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(self.failure(format!("admins/{uid}"), "create"));

        match inserted {
            Ok(row) => Ok(row),
            Err(StoreError::Conflict(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
