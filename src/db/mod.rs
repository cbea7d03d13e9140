use std::{fs, path::Path};

use chrono::Utc;
use sqlx::{error::ErrorKind, SqlitePool};
use thiserror::Error;

use crate::{
    diagnostics::{Diagnostics, PermissionDenied},
    models::{ContactInfo, PAGE_CONTACT},
};

mod admins;
mod appointments;
mod catalog;
mod pages;

pub use appointments::{AppointmentQuery, Transition};

// Primary SQLite result codes that mean the write was refused by policy
// rather than failed.
const SQLITE_PERM: i32 = 3;
const SQLITE_READONLY: i32 = 8;
const SQLITE_AUTH: i32 = 23;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {operation} on {path}")]
    PermissionDenied { path: String, operation: &'static str },

    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("stored document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Other(sqlx::Error),
}

/// Storage client handed to every handler through `AppState`.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
    diagnostics: Diagnostics,
}

impl Store {
    pub fn new(pool: SqlitePool, diagnostics: Diagnostics) -> Self {
        Self { pool, diagnostics }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Builds the error mapper for one store operation. Permission denials
    /// are reported on the diagnostics channel as they are classified.
    fn failure(
        &self,
        path: impl Into<String>,
        operation: &'static str,
    ) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
        let path = path.into();
        move |err| {
            let err = classify(err, path, operation);
            if let StoreError::PermissionDenied { path, operation } = &err {
                self.diagnostics
                    .report(PermissionDenied::new(path.clone(), operation));
            }
            err
        }
    }
}

pub fn classify(err: sqlx::Error, path: String, operation: &'static str) -> StoreError {
    if matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    ) {
        return StoreError::Unavailable(err.to_string());
    }

    if let Some(db_err) = err.as_database_error() {
        if db_err.kind() == ErrorKind::UniqueViolation {
            return StoreError::Conflict(db_err.message().to_string());
        }
        let primary = db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .map(|code| code & 0xff);
        if matches!(primary, Some(SQLITE_PERM | SQLITE_READONLY | SQLITE_AUTH)) {
            return StoreError::PermissionDenied { path, operation };
        }
    }

    StoreError::Other(err)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub fn ensure_sqlite_dir(db_url: &str) -> std::io::Result<()> {
    let path = if let Some(path) = db_url.strip_prefix("sqlite://") {
        Some(path)
    } else if let Some(path) = db_url.strip_prefix("sqlite:") {
        Some(path)
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(());
    };

    let path = path.split('?').next().unwrap_or(path);
    if path == ":memory:" || path.is_empty() {
        return Ok(());
    }

    let path = path.strip_prefix("file:").unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Seeds the contact page so the public site has something to show before
/// an admin edits it.
pub async fn seed_defaults(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let content = serde_json::to_string(&ContactInfo::default())
        .map_err(|err| sqlx::Error::Protocol(err.to_string()))?;
    sqlx::query(
        r#"INSERT INTO pages (key, content, updated_at)
           VALUES (?, ?, ?)
           ON CONFLICT(key) DO NOTHING"#,
    )
    .bind(PAGE_CONTACT)
    .bind(content)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
pub async fn test_store() -> Store {
    use sqlx::sqlite::SqlitePoolOptions;

    // One connection: every in-memory connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool).await.expect("migrations");
    Store::new(pool, Diagnostics::new(16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_urls_need_no_directory() {
        assert!(ensure_sqlite_dir("sqlite::memory:").is_ok());
        assert!(ensure_sqlite_dir("postgres://localhost/db").is_ok());
    }

    #[test]
    fn pool_failures_are_connectivity_errors() {
        let err = classify(sqlx::Error::PoolTimedOut, "appointments".into(), "create");
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[actix_web::test]
    async fn seeding_keeps_existing_contact_page() {
        let store = test_store().await;
        let custom = ContactInfo {
            phone: "0812 9999 0000".to_string(),
            ..ContactInfo::default()
        };
        store.save_contact(&custom).await.unwrap();

        seed_defaults(store.pool()).await.unwrap();
        seed_defaults(store.pool()).await.unwrap();

        assert_eq!(store.contact().await.unwrap(), custom);
    }

    #[actix_web::test]
    async fn read_only_writes_are_reported_as_permission_denied() {
        let store = test_store().await;
        let mut rx = store.diagnostics.subscribe();
        sqlx::query("PRAGMA query_only = ON")
            .execute(store.pool())
            .await
            .unwrap();

        let err = sqlx::query("DELETE FROM appointments")
            .execute(store.pool())
            .await
            .map_err(store.failure("appointments", "delete"))
            .unwrap_err();

        assert!(matches!(err, StoreError::PermissionDenied { operation: "delete", .. }));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.path, "appointments");
    }
}
