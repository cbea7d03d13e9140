use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

use super::{Store, StoreError};
use crate::models::{AboutContent, ContactInfo, PAGE_ABOUT, PAGE_CONTACT};

impl Store {
    async fn page<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let content = sqlx::query_scalar::<_, String>("SELECT content FROM pages WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(self.failure(format!("pages/{key}"), "get"))?;

        match content {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    async fn save_page<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let content = serde_json::to_string(value)?;
        sqlx::query(
            r#"INSERT INTO pages (key, content, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT(key) DO UPDATE SET
                 content = excluded.content,
                 updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(content)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(self.failure(format!("pages/{key}"), "write"))?;
        Ok(())
    }

    pub async fn about(&self) -> Result<Option<AboutContent>, StoreError> {
        self.page(PAGE_ABOUT).await
    }

    pub async fn save_about(&self, content: &AboutContent) -> Result<(), StoreError> {
        self.save_page(PAGE_ABOUT, content).await
    }

    /// Stored contact details, or the clinic defaults when none were saved.
    pub async fn contact(&self) -> Result<ContactInfo, StoreError> {
        Ok(self.page(PAGE_CONTACT).await?.unwrap_or_default())
    }

    pub async fn save_contact(&self, info: &ContactInfo) -> Result<(), StoreError> {
        self.save_page(PAGE_CONTACT, info).await
    }
}
