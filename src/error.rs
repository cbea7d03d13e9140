use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::{db::StoreError, validation::FieldErrors};

pub const MSG_GENERIC_FAILURE: &str = "Gagal mengirimkan formulir, silahkan coba lagi.";
pub const MSG_CONNECTION_FAILED: &str = "Koneksi ke database gagal. Silakan coba lagi.";
pub const MSG_BAD_CREDENTIALS: &str = "Email atau password yang Anda masukkan salah.";
pub const MSG_ADMIN_EXISTS: &str =
    "Seorang admin sudah terdaftar. Pendaftaran lebih lanjut tidak diizinkan.";
pub const MSG_CONFIRMATION_REQUIRED: &str = "Konfirmasi diperlukan.";
pub const MSG_VALIDATION_FAILED: &str = "Validasi gagal.";
pub const MSG_INVALID_PAYLOAD: &str = "Data yang dikirim tidak valid.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, fields: FieldErrors },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<ErrorDetails<'a>>,
}

#[derive(Serialize)]
struct ErrorDetails<'a> {
    fields: &'a FieldErrors,
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} tidak ditemukan."))
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(fields: FieldErrors) -> Self {
        Self::Validation {
            message: MSG_VALIDATION_FAILED.to_string(),
            fields,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(_) => Self::Unavailable(MSG_CONNECTION_FAILED.to_string()),
            StoreError::PermissionDenied { .. } => Self::Forbidden(MSG_GENERIC_FAILURE.to_string()),
            StoreError::Conflict(_) => Self::Conflict(MSG_GENERIC_FAILURE.to_string()),
            StoreError::Malformed(err) => Self::Internal(err.to_string()),
            StoreError::Other(err) => Self::Internal(err.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::Internal(detail) => {
                log::error!("Request failed: {detail}");
                MSG_GENERIC_FAILURE.to_string()
            }
            other => other.to_string(),
        };
        let details = match self {
            Self::Validation { fields, .. } => Some(ErrorDetails { fields }),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message,
                details,
            },
        })
    }
}
