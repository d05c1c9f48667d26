//! ---
//! spx_section: "05-networking-external-interfaces"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Translation of handler failures into HTTP responses."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use spectra_common::{FieldIssue, ValidationError};
use spectra_leads::LeadError;
use spectra_metrics::RejectionKind;
use thiserror::Error;
use tracing::{error, warn};

const INVALID_PAYLOAD: &str = "Invalid request payload";
const INTERNAL: &str = "Internal server error";

/// Domain failure that maps onto a specific status code.
#[derive(Debug, Error)]
#[error("{message} ({status})")]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Route not found")
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn timeout() -> Self {
        Self::new(StatusCode::REQUEST_TIMEOUT, "Request timed out")
    }

    fn kind(&self) -> RejectionKind {
        match self.status {
            StatusCode::NOT_FOUND => RejectionKind::NotFound,
            StatusCode::CONFLICT => RejectionKind::Conflict,
            StatusCode::PAYLOAD_TOO_LARGE => RejectionKind::PayloadTooLarge,
            StatusCode::REQUEST_TIMEOUT => RejectionKind::Timeout,
            status if status.is_server_error() => RejectionKind::Internal,
            _ => RejectionKind::Validation,
        }
    }
}

/// Every failure a handler can return. Converted to a response in one place.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Http(err) => err.status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> RejectionKind {
        match self {
            ApiError::Validation(_) => RejectionKind::Validation,
            ApiError::Http(err) => err.kind(),
            ApiError::Internal(_) => RejectionKind::Internal,
        }
    }
}

impl From<LeadError> for ApiError {
    fn from(err: LeadError) -> Self {
        match err {
            LeadError::Invalid(err) => ApiError::Validation(err),
            LeadError::Duplicate { email } => ApiError::Http(
                HttpError::conflict("Lead already submitted").with_details(json!({ "email": email })),
            ),
            LeadError::Sink(reason) => {
                ApiError::Internal(anyhow::anyhow!("lead sink failure: {reason}"))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::Http(HttpError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request payload too large",
            ));
        }
        ApiError::Validation(ValidationError::single("", rejection.body_text()))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldIssue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let body = match self {
            ApiError::Validation(err) => {
                warn!(issues = %err, "request validation failed");
                ErrorBody {
                    status: "error",
                    message: INVALID_PAYLOAD.to_owned(),
                    errors: Some(err.into_issues()),
                    details: None,
                }
            }
            ApiError::Http(err) if err.status.is_server_error() => {
                error!(status = %err.status, message = %err.message, "request failed");
                ErrorBody {
                    status: "error",
                    message: INTERNAL.to_owned(),
                    errors: None,
                    details: None,
                }
            }
            ApiError::Http(err) => {
                warn!(status = %err.status, message = %err.message, "request rejected");
                ErrorBody {
                    status: "error",
                    message: err.message,
                    errors: None,
                    details: err.details,
                }
            }
            ApiError::Internal(err) => {
                error!(error = %format!("{err:#}"), "unhandled error");
                ErrorBody {
                    status: "error",
                    message: INTERNAL.to_owned(),
                    errors: None,
                    details: None,
                }
            }
        };
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(kind);
        response
    }
}
