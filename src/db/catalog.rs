use chrono::Utc;

use super::{Store, StoreError};
use crate::{
    auth::new_id,
    models::{Doctor, GalleryImage, Service},
    validation::{NewDoctor, NewGalleryImage, NewService},
};

const SERVICE_COLUMNS: &str = "id, title, description, price, image, image_hint";
const DOCTOR_COLUMNS: &str = "id, name, specialty, bio, image, image_hint";
const GALLERY_COLUMNS: &str = "id, image_url, description, image_hint, created_at";

impl Store {
    pub async fn services(&self) -> Result<Vec<Service>, StoreError> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services ORDER BY title ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(self.failure("services", "list"))
    }

    pub async fn create_service(&self, new: NewService) -> Result<Service, StoreError> {
        sqlx::query_as::<_, Service>(&format!(
            r#"INSERT INTO services (id, title, description, price, image, image_hint)
               VALUES (?, ?, ?, ?, ?, ?)
               RETURNING {SERVICE_COLUMNS}"#
        ))
        .bind(new_id())
        .bind(new.title)
        .bind(new.description)
        .bind(new.price)
        .bind(new.image)
        .bind(new.image_hint)
        .fetch_one(&self.pool)
        .await
        .map_err(self.failure("services", "create"))
    }

    pub async fn update_service(
        &self,
        id: &str,
        new: NewService,
    ) -> Result<Option<Service>, StoreError> {
        sqlx::query_as::<_, Service>(&format!(
            r#"UPDATE services
               SET title = ?, description = ?, price = ?, image = ?, image_hint = ?
               WHERE id = ?
               RETURNING {SERVICE_COLUMNS}"#
        ))
        .bind(new.title)
        .bind(new.description)
        .bind(new.price)
        .bind(new.image)
        .bind(new.image_hint)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(self.failure(format!("services/{id}"), "update"))
    }

    pub async fn delete_service(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(self.failure(format!("services/{id}"), "delete"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(self.failure("doctors", "list"))
    }

    pub async fn create_doctor(&self, new: NewDoctor) -> Result<Doctor, StoreError> {
        sqlx::query_as::<_, Doctor>(&format!(
            r#"INSERT INTO doctors (id, name, specialty, bio, image, image_hint)
               VALUES (?, ?, ?, ?, ?, ?)
               RETURNING {DOCTOR_COLUMNS}"#
        ))
        .bind(new_id())
        .bind(new.name)
        .bind(new.specialty)
        .bind(new.bio)
        .bind(new.image)
        .bind(new.image_hint)
        .fetch_one(&self.pool)
        .await
        .map_err(self.failure("doctors", "create"))
    }

    pub async fn update_doctor(&self, id: &str, new: NewDoctor) -> Result<Option<Doctor>, StoreError> {
        sqlx::query_as::<_, Doctor>(&format!(
            r#"UPDATE doctors
               SET name = ?, specialty = ?, bio = ?, image = ?, image_hint = ?
               WHERE id = ?
               RETURNING {DOCTOR_COLUMNS}"#
        ))
        .bind(new.name)
        .bind(new.specialty)
        .bind(new.bio)
        .bind(new.image)
        .bind(new.image_hint)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(self.failure(format!("doctors/{id}"), "update"))
    }

    pub async fn delete_doctor(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(self.failure(format!("doctors/{id}"), "delete"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn gallery(&self) -> Result<Vec<GalleryImage>, StoreError> {
        sqlx::query_as::<_, GalleryImage>(&format!(
            "SELECT {GALLERY_COLUMNS} FROM gallery ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(self.failure("gallery", "list"))
    }

    pub async fn create_gallery_image(&self, new: NewGalleryImage) -> Result<GalleryImage, StoreError> {
        sqlx::query_as::<_, GalleryImage>(&format!(
            r#"INSERT INTO gallery (id, image_url, description, image_hint, created_at)
               VALUES (?, ?, ?, ?, ?)
               RETURNING {GALLERY_COLUMNS}"#
        ))
        .bind(new_id())
        .bind(new.image_url)
        .bind(new.description)
        .bind(new.image_hint)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(self.failure("gallery", "create"))
    }

    /// Edits keep the original `created_at` so gallery order is stable.
    pub async fn update_gallery_image(
        &self,
        id: &str,
        new: NewGalleryImage,
    ) -> Result<Option<GalleryImage>, StoreError> {
        sqlx::query_as::<_, GalleryImage>(&format!(
            r#"UPDATE gallery
               SET image_url = ?, description = ?, image_hint = ?
               WHERE id = ?
               RETURNING {GALLERY_COLUMNS}"#
        ))
        .bind(new.image_url)
        .bind(new.description)
        .bind(new.image_hint)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(self.failure(format!("gallery/{id}"), "update"))
    }

    pub async fn delete_gallery_image(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM gallery WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(self.failure(format!("gallery/{id}"), "delete"))?;
        Ok(result.rows_affected() > 0)
    }
}
