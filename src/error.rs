use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;

use crate::repository::RepositoryError;

/// Everything the payslip endpoint can answer with besides success. The
/// message is the whole payload; store internals never reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Invalid query string")]
    InvalidQuery,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid field {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    #[error("No payslips found for this citizen ID")]
    NoPayslips,

    #[error("Period not found")]
    PeriodNotFound { available: Vec<String> },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Failed to access the database")]
    Storage(#[from] RepositoryError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson
            | ApiError::InvalidQuery
            | ApiError::MissingFields(_)
            | ApiError::InvalidField { .. } => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NoPayslips | ApiError::PeriodNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Storage(e) = self {
            tracing::error!(error = %e, "Payslip store failure");
        }

        let body = match self {
            ApiError::PeriodNotFound { available } => json!({
                "error": self.to_string(),
                "availablePeriods": available,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Query extraction failures answer with the same `{error}` body as the handlers.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected query string");
        ApiError::InvalidQuery.into()
    })
}
