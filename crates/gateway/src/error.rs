//! HTTP error responses.
//!
//! Every failure leaves the gateway as
//! `{"status": 400, "errors": ["..."], "dateTime": "2025-01-01T12:00:00"}`.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chatgate_core::error::{Error, ProviderError, ValidationError};
use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub errors: Vec<String>,
    #[serde(rename = "dateTime")]
    pub date_time: NaiveDateTime,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, errors: Vec<String>) -> Self {
        Self {
            status: status.as_u16(),
            errors,
            date_time: Local::now().naive_local().trunc_subsecs(0),
        }
    }
}

/// A failed request: status plus human-readable messages.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    errors: Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            errors: vec![message.into()],
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn provider_status(e: &ProviderError) -> StatusCode {
    match e {
        ProviderError::RateLimited { .. } | ProviderError::NotConfigured(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ProviderError::ApiError { .. }
        | ProviderError::AuthenticationFailed(_)
        | ProviderError::StreamInterrupted(_)
        | ProviderError::Network(_)
        | ProviderError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Validation(v) => v.into(),
            Error::Provider(p) => Self::new(provider_status(&p), p.to_string()),
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::new(e.status(), e.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::new(e.status(), e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::new(e.status(), e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), errors = ?self.errors, "Request failed");
        } else {
            warn!(status = self.status.as_u16(), errors = ?self.errors, "Request rejected");
        }
        (self.status, Json(ErrorResponse::new(self.status, self.errors))).into_response()
    }
}
