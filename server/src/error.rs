use axum::response::{IntoResponse, Response};
use patient_db::DbError;
use thiserror::Error;

use crate::models::{HttpResponse, ResponseCode};

pub const NOT_FOUND_MESSAGE: &str = "Patient not found";
pub const BAD_REQUEST_MESSAGE: &str = "Invalid request body";
pub const SERVER_ERROR_MESSAGE: &str = "An error occurred";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Patient not found")]
    NotFound,
    #[error("Invalid request body: {0}")]
    BadRequest(String),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Every failure leaves as an envelope. Database details are logged here and
/// never sent to the client.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = match self {
            ApiError::NotFound => HttpResponse::new(ResponseCode::NotFound, NOT_FOUND_MESSAGE),
            ApiError::BadRequest(reason) => {
                tracing::warn!(%reason, "Rejected request body.");
                HttpResponse::new(ResponseCode::BadRequest, BAD_REQUEST_MESSAGE)
            }
            ApiError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                HttpResponse::new(ResponseCode::InternalServerError, SERVER_ERROR_MESSAGE)
            }
        };

        envelope.into_response()
    }
}
