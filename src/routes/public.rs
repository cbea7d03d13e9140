use actix_web::{http::header, web, Either, HttpRequest, HttpResponse};
use serde_json::json;

use crate::{
    auth::{authenticate_credentials, clear_logout_cookie, hash_password, logout_cookie},
    diagnostics::PermissionDenied,
    error::{AppError, MSG_ADMIN_EXISTS, MSG_BAD_CREDENTIALS},
    models::testimonials,
    state::{AppState, ServerEvent, EVENT_CREATED},
    validation::{BookingInput, CredentialsInput},
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(web::resource("/services").route(web::get().to(services)))
        .service(web::resource("/about").route(web::get().to(about)))
        .service(web::resource("/contact").route(web::get().to(contact)))
        .service(web::resource("/booking").route(web::post().to(create_booking)))
        .service(web::resource("/health").route(web::get().to(health)))
        // Session routes sit outside the authenticated /admin scope and must be
        // registered before it.
        .service(web::resource("/admin/login").route(web::post().to(login)))
        .service(web::resource("/admin/logout").route(web::get().to(logout)))
        .service(
            web::resource("/admin/register")
                .route(web::get().to(registration_status))
                .route(web::post().to(register_first_admin)),
        );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

async fn home(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let services = state.store.services().await?;
    let team = state.store.doctors().await?;
    let gallery = state.store.gallery().await?;

    Ok(HttpResponse::Ok().json(json!({
        "services": services,
        "team": team,
        "gallery": gallery,
        "testimonials": testimonials(),
    })))
}

async fn services(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.store.services().await?))
}

async fn about(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let about = state.store.about().await?;
    let team = state.store.doctors().await?;
    Ok(HttpResponse::Ok().json(json!({ "about": about, "team": team })))
}

async fn contact(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let info = state.store.contact().await?;
    let service_options: Vec<String> = state
        .store
        .services()
        .await?
        .into_iter()
        .map(|service| service.title)
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "whatsapp_url": whatsapp_url(&info.phone),
        "contact": info,
        "booking_anchor": "#booking",
        "service_options": service_options,
    })))
}

/// Builds a wa.me link: digits only, local `0` prefix swapped for the
/// Indonesian country code.
pub fn whatsapp_url(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let number = if let Some(rest) = digits.strip_prefix('0') {
        format!("62{rest}")
    } else if digits.starts_with("62") {
        digits
    } else {
        format!("62{digits}")
    };
    format!("https://wa.me/{number}")
}

async fn create_booking(
    state: web::Data<AppState>,
    payload: Either<web::Json<BookingInput>, web::Form<BookingInput>>,
) -> Result<HttpResponse, AppError> {
    let input = match payload {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let booking = input.validate()?;
    let appointment = state.store.create_appointment(booking).await?;

    log::info!(
        "New booking {} for {} on {}",
        appointment.id,
        appointment.service,
        appointment.date
    );
    state.publish(ServerEvent::from_appointment(EVENT_CREATED, &appointment));

    Ok(HttpResponse::Created().json(json!({
        "message": format!(
            "Terima kasih, {}. Kami akan segera menghubungi Anda untuk konfirmasi.",
            appointment.name
        ),
        "appointment": appointment,
    })))
}

async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Either<web::Json<CredentialsInput>, web::Form<CredentialsInput>>,
) -> Result<HttpResponse, AppError> {
    let input = match payload {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let credentials = input.validate()?;

    let Some(admin) =
        authenticate_credentials(&state, &credentials.email, &credentials.password).await?
    else {
        log::info!("Failed admin login for {}", credentials.email);
        return Err(AppError::Unauthorized(MSG_BAD_CREDENTIALS.to_string()));
    };

    Ok(HttpResponse::Ok()
        .cookie(clear_logout_cookie(&req))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(json!({
            "ok": true,
            "email": admin.email,
            "redirect": "/admin/dashboard",
        })))
}

async fn logout(req: HttpRequest) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, "/"))
        .cookie(logout_cookie(&req))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

async fn registration_status(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let open = !state.store.admin_exists().await?;
    Ok(HttpResponse::Ok().json(json!({ "open": open })))
}

/// First-run registration. The store enforces the single-admin rule; the
/// existence check here only skips password hashing once the gate is closed.
async fn register_first_admin(
    state: web::Data<AppState>,
    payload: Either<web::Json<CredentialsInput>, web::Form<CredentialsInput>>,
) -> Result<HttpResponse, AppError> {
    let input = match payload {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let credentials = input.validate()?;

    let created = if state.store.admin_exists().await? {
        None
    } else {
        let password_hash = hash_password(&credentials.password)
            .map_err(|err| AppError::Internal(format!("password hash failed: {err}")))?;
        state
            .store
            .register_first_admin(&credentials.email, &password_hash)
            .await?
    };

    let Some(admin) = created else {
        state.diagnostics.report(
            PermissionDenied::new("admins", "create")
                .with_data(json!({ "email": credentials.email })),
        );
        return Err(AppError::Forbidden(MSG_ADMIN_EXISTS.to_string()));
    };

    log::info!("First admin registered: {}", admin.email);
    Ok(HttpResponse::Created().json(json!({
        "message": "Akun admin pertama telah dibuat. Silakan login.",
        "uid": admin.uid,
        "email": admin.email,
        "created_at": admin.created_at,
    })))
}
