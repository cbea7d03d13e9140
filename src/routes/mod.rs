use actix_web::web;
use serde::{Deserialize, Serialize};

use std::fmt::Display;

use crate::error::{AppError, MSG_CONFIRMATION_REQUIRED, MSG_INVALID_PAYLOAD};

pub mod admin;
pub mod content;
pub mod events;
pub mod public;

/// Extractor failures (unparsable bodies, wrong field types, bad query
/// strings) are answered in the same JSON envelope as every other error.
pub fn configure_payloads(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| payload_error(err)))
        .app_data(web::FormConfig::default().error_handler(|err, _| payload_error(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| payload_error(err)));
}

fn payload_error(err: impl Display) -> actix_web::Error {
    log::debug!("Rejected request payload: {err}");
    AppError::BadRequest(MSG_INVALID_PAYLOAD.to_string()).into()
}

/// Destructive admin actions must be confirmed explicitly with `?confirm=true`.
#[derive(Debug, Default, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub confirm: bool,
}

impl Confirmation {
    pub fn require(&self) -> Result<(), AppError> {
        if self.confirm {
            Ok(())
        } else {
            Err(AppError::BadRequest(MSG_CONFIRMATION_REQUIRED.to_string()))
        }
    }
}

/// Encodes one Server-Sent Events frame.
pub fn sse_frame<T: Serialize>(event: &str, payload: &T) -> web::Bytes {
    let payload = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    web::Bytes::from(format!("event: {event}\ndata: {payload}\n\n"))
}

#[cfg(test)]
pub(crate) mod testing {
    use actix_web::web;
    use actix_web_httpauth::headers::authorization::{Authorization, Basic};

    use crate::{auth::hash_password, db::test_store, state::AppState};

    pub const ADMIN_EMAIL: &str = "admin@aurora.com";
    pub const ADMIN_PASSWORD: &str = "rahasia123";

    pub async fn state() -> web::Data<AppState> {
        let store = test_store().await;
        let diagnostics = store.diagnostics().clone();
        web::Data::new(AppState::new(store, diagnostics, 16))
    }

    pub async fn state_with_admin() -> web::Data<AppState> {
        let state = state().await;
        let hash = hash_password(ADMIN_PASSWORD).unwrap();
        state
            .store
            .register_first_admin(ADMIN_EMAIL, &hash)
            .await
            .unwrap()
            .unwrap();
        state
    }

    pub fn admin_auth() -> Authorization<Basic> {
        Authorization::from(Basic::new(ADMIN_EMAIL, Some(ADMIN_PASSWORD)))
    }
}
