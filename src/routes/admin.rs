use actix_web::{http::header, middleware::from_fn, web, HttpResponse};
use actix_web_httpauth::{extractors::basic, middleware::HttpAuthentication};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{admin_validator, logout_guard, AdminIdentity, AUTH_REALM},
    db::{AppointmentQuery, Transition},
    error::AppError,
    models::AppointmentStatus,
    routes::{content, events, Confirmation},
    state::{AppState, ServerEvent, EVENT_DELETED, EVENT_PROCESSED},
};

const RECENT_LIMIT: u32 = 6;

#[derive(Deserialize)]
struct AppointmentFilter {
    status: Option<AppointmentStatus>,
    name: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

impl From<AppointmentFilter> for AppointmentQuery {
    fn from(filter: AppointmentFilter) -> Self {
        let defaults = AppointmentQuery::default();
        Self {
            status: filter.status.unwrap_or(defaults.status),
            name_prefix: filter.name.filter(|name| !name.trim().is_empty()),
            page: filter.page.unwrap_or(defaults.page),
            page_size: filter.page_size.unwrap_or(defaults.page_size),
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Realm for the challenge sent when no credentials are supplied.
    cfg.app_data(basic::Config::default().realm(AUTH_REALM));
    cfg.service(
        web::scope("/admin")
            .wrap(HttpAuthentication::basic(admin_validator))
            .wrap(from_fn(logout_guard))
            .service(web::resource("").route(web::get().to(index)))
            .service(web::resource("/").route(web::get().to(index)))
            .service(web::resource("/dashboard").route(web::get().to(dashboard)))
            .configure(events::configure)
            .service(web::resource("/appointments").route(web::get().to(list_appointments)))
            .service(
                web::resource("/appointments/{id}")
                    .route(web::get().to(appointment_detail))
                    .route(web::delete().to(delete_appointment)),
            )
            .service(
                web::resource("/appointments/{id}/process")
                    .route(web::post().to(process_appointment)),
            )
            .configure(content::configure),
    );
}

async fn index() -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, "/admin/dashboard"))
        .finish()
}

async fn dashboard(
    state: web::Data<AppState>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, AppError> {
    let counts = state.store.appointment_counts().await?;
    let recent = state.store.recent_appointments(RECENT_LIMIT).await?;

    Ok(HttpResponse::Ok().json(json!({
        "admin_uid": admin.uid,
        "admin_email": admin.email,
        "stats": counts,
        "recent": recent,
    })))
}

async fn list_appointments(
    state: web::Data<AppState>,
    filter: web::Query<AppointmentFilter>,
) -> Result<HttpResponse, AppError> {
    let query = AppointmentQuery::from(filter.into_inner());
    let page = state.store.list_appointments(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

async fn appointment_detail(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let appointment_id = path.into_inner();
    match state.store.appointment(&appointment_id).await? {
        Some(appointment) => Ok(HttpResponse::Ok().json(appointment)),
        None => Err(AppError::not_found("Janji temu")),
    }
}

async fn process_appointment(
    state: web::Data<AppState>,
    path: web::Path<String>,
    confirmation: web::Query<Confirmation>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, AppError> {
    confirmation.require()?;
    let appointment_id = path.into_inner();

    match state.store.mark_processed(&appointment_id).await? {
        Transition::Applied(appointment) => {
            log::info!("{} processed appointment {}", admin.email, appointment.id);
            state.publish(
                ServerEvent::from_appointment(EVENT_PROCESSED, &appointment)
                    .with_previous(AppointmentStatus::Pending),
            );
            Ok(HttpResponse::Ok().json(json!({
                "message": "Janji temu telah dipindahkan ke \"Sudah Dibaca\".",
                "appointment": appointment,
            })))
        }
        Transition::Rejected(current) => Err(AppError::Conflict(format!(
            "Janji temu sudah berstatus {current}."
        ))),
        Transition::Missing => Err(AppError::not_found("Janji temu")),
    }
}

async fn delete_appointment(
    state: web::Data<AppState>,
    path: web::Path<String>,
    confirmation: web::Query<Confirmation>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, AppError> {
    confirmation.require()?;
    let appointment_id = path.into_inner();

    let Some(appointment) = state.store.delete_appointment(&appointment_id).await? else {
        return Err(AppError::not_found("Janji temu"));
    };

    log::info!("{} deleted appointment {}", admin.email, appointment.id);
    state.publish(ServerEvent::from_appointment(EVENT_DELETED, &appointment));
    Ok(HttpResponse::Ok().json(json!({
        "message": "Janji temu telah berhasil dihapus.",
        "id": appointment.id,
    })))
}
