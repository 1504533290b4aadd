use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `SERIAL_NUMBER_TAKEN`,
    /// `WEIGHT_LIMIT_EXCEEDED`, `LOW_BATTERY`, `NOT_FOUND`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Code must contain only upper case letters, digits, and underscores")]
    pub message: String,
    /// Request field that failed validation, when one can be singled out.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "medications[0].code")]
    pub field: Option<String>,
}

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
    #[error("serial number already in use")]
    SerialNumberTaken,
    #[error("{0}")]
    NotFound(String),
    /// Loaded plus requested medication weight is above the drone's limit.
    #[error("weight {requested} exceeds limit {limit}")]
    WeightLimitExceeded { limit: i32, requested: i64 },
    /// The drone is `LOADING` with less charge than loading requires.
    #[error("battery level {battery_level} too low for loading")]
    LowBattery { battery_level: i32 },
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                    field: None,
                },
            ),
            AppError::InvalidField { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message,
                    field: Some(field),
                },
            ),
            AppError::SerialNumberTaken => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "SERIAL_NUMBER_TAKEN",
                    message: "The serial number is already in use".into(),
                    field: Some("serial_number".into()),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                    field: None,
                },
            ),
            AppError::WeightLimitExceeded { limit, requested } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "WEIGHT_LIMIT_EXCEEDED",
                    message: format!(
                        "The medications weight ({requested}) exceeds the drone's weight limit ({limit})"
                    ),
                    field: None,
                },
            ),
            AppError::LowBattery { battery_level } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "LOW_BATTERY",
                    message: format!(
                        "The drone's battery level is {battery_level}%, below the {}% required in LOADING state",
                        fleet_common::MIN_LOADING_BATTERY
                    ),
                    field: None,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                        field: None,
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}
