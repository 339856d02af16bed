use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use patient_db::PatientRecord;
use serde::Serialize;
use serde_json::Value;

/// The fixed set of outcomes an endpoint can report. Each variant carries
/// both the numeric code and its label so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Ok,
    Created,
    BadRequest,
    NotFound,
    InternalServerError,
}

impl ResponseCode {
    pub fn code(self) -> u16 {
        self.http_status().as_u16()
    }

    pub fn status(self) -> &'static str {
        match self {
            ResponseCode::Ok => "OK",
            ResponseCode::Created => "CREATED",
            ResponseCode::BadRequest => "BAD_REQUEST",
            ResponseCode::NotFound => "NOT_FOUND",
            ResponseCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            ResponseCode::Ok => StatusCode::OK,
            ResponseCode::Created => StatusCode::CREATED,
            ResponseCode::BadRequest => StatusCode::BAD_REQUEST,
            ResponseCode::NotFound => StatusCode::NOT_FOUND,
            ResponseCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Envelope returned by every endpoint:
/// `{ "code": 200, "status": "OK", "message": "...", "data": ... }`.
#[derive(Debug, Clone, Serialize)]
pub struct HttpResponse {
    #[serde(skip)]
    kind: ResponseCode,
    code: u16,
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl HttpResponse {
    pub fn new(kind: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.code(),
            status: kind.status(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_patient(self, patient: PatientRecord) -> Self {
        self.with_data(Value::Object(patient))
    }

    pub fn with_patients(self, patients: Vec<PatientRecord>) -> Self {
        self.with_data(Value::Array(
            patients.into_iter().map(Value::Object).collect(),
        ))
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        (self.kind.http_status(), Json(self)).into_response()
    }
}
