use actix_web::{
    body::BoxBody,
    cookie::{time::Duration, Cookie, SameSite},
    dev::{ServiceRequest, ServiceResponse},
    error::InternalError,
    http::header::{self, HeaderValue},
    middleware::Next,
    web, Error, HttpMessage, HttpRequest, HttpResponse, ResponseError,
};
use actix_web_httpauth::extractors::basic::BasicAuth;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use serde_json::json;
use uuid::Uuid;

use crate::{
    db::StoreError,
    error::{AppError, MSG_BAD_CREDENTIALS},
    state::AppState,
};

pub const AUTH_REALM: &str = "Aurora Admin";
const LOGOUT_COOKIE: &str = "aurora_logged_out";

/// The signed-in admin, inserted into request extensions by [`admin_validator`].
#[derive(Clone, Debug)]
pub struct AdminIdentity {
    pub uid: String,
    pub email: String,
}

pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn authenticate_credentials(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<Option<AdminIdentity>, StoreError> {
    let email = email.trim().to_lowercase();
    let Some(admin) = state.store.admin_by_email(&email).await? else {
        return Ok(None);
    };

    if !verify_password(password, &admin.password_hash) {
        return Ok(None);
    }

    Ok(Some(AdminIdentity {
        uid: admin.uid,
        email: admin.email,
    }))
}

pub async fn admin_validator(
    req: ServiceRequest,
    credentials: BasicAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
        return Err((AppError::Internal("missing app state".into()).into(), req));
    };
    let password = credentials.password().unwrap_or_default();

    match authenticate_credentials(&state, credentials.user_id(), password).await {
        Ok(Some(admin)) => {
            req.extensions_mut().insert(admin);
            Ok(req)
        }
        Ok(None) => Err((challenge(), req)),
        Err(err) => Err((AppError::from(err).into(), req)),
    }
}

/// 401 for rejected Basic credentials: the JSON error body plus a
/// `WWW-Authenticate` challenge so clients prompt again.
fn challenge() -> Error {
    let mut response = AppError::Unauthorized(MSG_BAD_CREDENTIALS.into()).error_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{AUTH_REALM}\"")) {
        headers.insert(header::WWW_AUTHENTICATE, value);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    InternalError::from_response(MSG_BAD_CREDENTIALS, response).into()
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Marks the browser as signed out until the next successful login.
pub fn logout_cookie(req: &HttpRequest) -> Cookie<'static> {
    logout_marker(req, "1", Duration::days(365))
}

/// Removes the signed-out marker after a successful login.
pub fn clear_logout_cookie(req: &HttpRequest) -> Cookie<'static> {
    logout_marker(req, "", Duration::ZERO)
}

fn logout_marker(req: &HttpRequest, value: &'static str, max_age: Duration) -> Cookie<'static> {
    let secure = req.connection_info().scheme() == "https";
    Cookie::build(LOGOUT_COOKIE, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .finish()
}

pub fn is_logged_out(req: &HttpRequest) -> bool {
    req.cookie(LOGOUT_COOKIE).is_some()
}

/// Browsers keep replaying Basic credentials after sign-out, so a signed-out
/// session is recognised by cookie and refused before authentication runs.
pub async fn logout_guard<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<BoxBody>, Error>
where
    B: actix_web::body::MessageBody + 'static,
{
    if is_logged_out(req.request()) {
        let response = HttpResponse::Unauthorized()
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(json!({
                "error": {
                    "code": "LOGGED_OUT",
                    "message": "Sesi Anda telah berakhir. Silakan login kembali.",
                    "login": "/admin/login",
                }
            }));
        return Ok(req.into_response(response));
    }

    let res = next.call(req).await?;
    Ok(res.map_into_boxed_body())
}
