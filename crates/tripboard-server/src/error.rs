use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tripboard_core::PlanError;
use tripboard_schema::{DateParseError, TripDateRange};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Failure of a route handler, rendered as a JSON error body.
#[derive(Debug)]
pub enum ApiError {
    Plan(PlanError),
    InvalidDate(DateParseError),
    /// Request body or path that axum could not extract.
    Rejected {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        ApiError::Plan(err)
    }
}

impl From<DateParseError> for ApiError {
    fn from(err: DateParseError) -> Self {
        ApiError::InvalidDate(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            code: "invalid_body",
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            code: "invalid_path",
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidDate(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    error: "invalid_date",
                    message: err.to_string(),
                },
            ),
            ApiError::Rejected {
                status,
                code,
                message,
            } => (
                status,
                ErrorBody {
                    error: code,
                    message,
                },
            ),
            ApiError::Plan(PlanError::Storage(err)) => {
                tracing::error!(error = ?err, "trip storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal",
                        message: "internal error".to_string(),
                    },
                )
            }
            ApiError::Plan(err @ PlanError::NotFound { .. }) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: err.code(),
                    message: err.to_string(),
                },
            ),
            ApiError::Plan(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    error: err.code(),
                    message: err.to_string(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub fn parse_dates(start: &str, end: &str) -> Result<TripDateRange, ApiError> {
    Ok(TripDateRange::parse(start, end)?)
}
