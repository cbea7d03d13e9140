//! Admin editors for the content the public pages display: services, team
//! members, gallery images and the about/contact singletons.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    auth::AdminIdentity,
    error::AppError,
    routes::Confirmation,
    state::AppState,
    validation::{AboutInput, ContactInput, DoctorInput, GalleryInput, ServiceInput},
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/services")
            .route(web::get().to(list_services))
            .route(web::post().to(create_service)),
    )
    .service(
        web::resource("/services/{id}")
            .route(web::put().to(update_service))
            .route(web::delete().to(delete_service)),
    )
    .service(
        web::resource("/team")
            .route(web::get().to(list_team))
            .route(web::post().to(create_doctor)),
    )
    .service(
        web::resource("/team/{id}")
            .route(web::put().to(update_doctor))
            .route(web::delete().to(delete_doctor)),
    )
    .service(
        web::resource("/gallery")
            .route(web::get().to(list_gallery))
            .route(web::post().to(create_gallery_image)),
    )
    .service(
        web::resource("/gallery/{id}")
            .route(web::put().to(update_gallery_image))
            .route(web::delete().to(delete_gallery_image)),
    )
    .service(
        web::resource("/about")
            .route(web::get().to(about))
            .route(web::put().to(save_about)),
    )
    .service(
        web::resource("/contact")
            .route(web::get().to(contact))
            .route(web::put().to(save_contact)),
    );
}

fn deleted(id: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "id": id, "deleted": true }))
}

async fn list_services(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.store.services().await?))
}

async fn create_service(
    state: web::Data<AppState>,
    payload: web::Json<ServiceInput>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, AppError> {
    let service = payload.into_inner().validate()?;
    let service = state.store.create_service(service).await?;
    log::info!("{} created service {}", admin.email, service.title);
    Ok(HttpResponse::Created().json(service))
}

async fn update_service(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ServiceInput>,
) -> Result<HttpResponse, AppError> {
    let service = payload.into_inner().validate()?;
    state
        .store
        .update_service(&path, service)
        .await?
        .map(|service| HttpResponse::Ok().json(service))
        .ok_or_else(|| AppError::not_found("Layanan"))
}

async fn delete_service(
    state: web::Data<AppState>,
    path: web::Path<String>,
    confirmation: web::Query<Confirmation>,
) -> Result<HttpResponse, AppError> {
    confirmation.require()?;
    if !state.store.delete_service(&path).await? {
        return Err(AppError::not_found("Layanan"));
    }
    Ok(deleted(&path))
}

async fn list_team(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.store.doctors().await?))
}

async fn create_doctor(
    state: web::Data<AppState>,
    payload: web::Json<DoctorInput>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, AppError> {
    let doctor = payload.into_inner().validate()?;
    let doctor = state.store.create_doctor(doctor).await?;
    log::info!("{} added team member {}", admin.email, doctor.name);
    Ok(HttpResponse::Created().json(doctor))
}

async fn update_doctor(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<DoctorInput>,
) -> Result<HttpResponse, AppError> {
    let doctor = payload.into_inner().validate()?;
    state
        .store
        .update_doctor(&path, doctor)
        .await?
        .map(|doctor| HttpResponse::Ok().json(doctor))
        .ok_or_else(|| AppError::not_found("Dokter"))
}

async fn delete_doctor(
    state: web::Data<AppState>,
    path: web::Path<String>,
    confirmation: web::Query<Confirmation>,
) -> Result<HttpResponse, AppError> {
    confirmation.require()?;
    if !state.store.delete_doctor(&path).await? {
        return Err(AppError::not_found("Dokter"));
    }
    Ok(deleted(&path))
}

async fn list_gallery(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.store.gallery().await?))
}

async fn create_gallery_image(
    state: web::Data<AppState>,
    payload: web::Json<GalleryInput>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, AppError> {
    let image = payload.into_inner().validate()?;
    let image = state.store.create_gallery_image(image).await?;
    log::info!("{} added gallery image {}", admin.email, image.id);
    Ok(HttpResponse::Created().json(image))
}

async fn update_gallery_image(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<GalleryInput>,
) -> Result<HttpResponse, AppError> {
    let image = payload.into_inner().validate()?;
    state
        .store
        .update_gallery_image(&path, image)
        .await?
        .map(|image| HttpResponse::Ok().json(image))
        .ok_or_else(|| AppError::not_found("Gambar"))
}

async fn delete_gallery_image(
    state: web::Data<AppState>,
    path: web::Path<String>,
    confirmation: web::Query<Confirmation>,
) -> Result<HttpResponse, AppError> {
    confirmation.require()?;
    if !state.store.delete_gallery_image(&path).await? {
        return Err(AppError::not_found("Gambar"));
    }
    Ok(deleted(&path))
}

async fn about(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.store.about().await?))
}

async fn save_about(
    state: web::Data<AppState>,
    payload: web::Json<AboutInput>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, AppError> {
    let content = payload.into_inner().validate()?;
    state.store.save_about(&content).await?;
    log::info!("{} updated the about page", admin.email);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Konten halaman \"Tentang Kami\" berhasil diperbarui.",
        "about": content,
    })))
}

async fn contact(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.store.contact().await?))
}

async fn save_contact(
    state: web::Data<AppState>,
    payload: web::Json<ContactInput>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, AppError> {
    let info = payload.into_inner().validate()?;
    state.store.save_contact(&info).await?;
    log::info!("{} updated the contact page", admin.email);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Informasi kontak berhasil diperbarui.",
        "contact": info,
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    use crate::routes::{admin, testing};

    #[actix_web::test]
    async fn service_lifecycle() {
        let state = testing::state_with_admin().await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(admin::configure)).await;

        let req = test::TestRequest::post()
            .uri("/admin/services")
            .insert_header(testing::admin_auth())
            .set_json(serde_json::json!({
                "title": "Facial Glow",
                "description": "Perawatan wajah untuk kulit cerah.",
                "price": "500000",
                "image": "https://picsum.photos/seed/facial/400/300",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["price"], 500000.0);

        let req = test::TestRequest::put()
            .uri(&format!("/admin/services/{id}"))
            .insert_header(testing::admin_auth())
            .set_json(serde_json::json!({
                "title": "Facial Glow Deluxe",
                "description": "Perawatan wajah untuk kulit cerah.",
                "price": 650000,
                "image": "https://picsum.photos/seed/facial/400/300",
                "image_hint": "facial treatment",
            }))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["title"], "Facial Glow Deluxe");

        let req = test::TestRequest::delete()
            .uri(&format!("/admin/services/{id}?confirm=true"))
            .insert_header(testing::admin_auth())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete()
            .uri(&format!("/admin/services/{id}?confirm=true"))
            .insert_header(testing::admin_auth())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn invalid_team_member_lists_field_errors() {
        let state = testing::state_with_admin().await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(admin::configure)).await;

        let req = test::TestRequest::post()
            .uri("/admin/team")
            .insert_header(testing::admin_auth())
            .set_json(serde_json::json!({
                "name": "dr",
                "specialty": "Kul",
                "bio": "singkat",
                "image": "ftp://example.com/a.png",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        let fields = &body["error"]["details"]["fields"];
        assert!(fields["name"].is_string());
        assert!(fields["bio"].is_string());
        assert!(fields["image"].is_string());
        assert!(fields["specialty"].is_string());
        assert!(state.store.doctors().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn contact_page_is_editable() {
        let state = testing::state_with_admin().await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(admin::configure)).await;

        let req = test::TestRequest::put()
            .uri("/admin/contact")
            .insert_header(testing::admin_auth())
            .set_json(serde_json::json!({
                "address": "Jl. Melati No. 8, Bandung, Indonesia",
                "phone": "0812 3456 7890",
                "email": "halo@aurorabeauty.com",
                "hours": "Senin - Jumat: 10:00 - 19:00",
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/admin/contact")
            .insert_header(testing::admin_auth())
            .to_request();
        let contact: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(contact["email"], "halo@aurorabeauty.com");
    }
}
