pub mod patient;

pub use patient::*;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use patient_db::PatientRecord;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{HttpResponse, ResponseCode};

pub const WELCOME_MESSAGE: &str = "Server is up";
pub const ROUTE_NOT_FOUND: &str = "Route does not exist on the server";

/// GET /
pub async fn welcome() -> HttpResponse {
    HttpResponse::new(ResponseCode::Ok, WELCOME_MESSAGE)
}

/// Anything no route matches, including unsupported methods on known paths.
/// Answers 200, not 404.
pub async fn route_not_found() -> HttpResponse {
    HttpResponse::new(ResponseCode::Ok, ROUTE_NOT_FOUND)
}

/// A request body that must be a JSON object. Malformed JSON, a wrong content
/// type or a non-object value all turn into a 400 envelope instead of axum's
/// plain-text rejection.
#[derive(Debug)]
pub struct PatientBody(pub PatientRecord);

#[async_trait]
impl<S> FromRequest<S> for PatientBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(ApiError::BadRequest(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
