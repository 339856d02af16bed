use axum::extract::{Path, State};
use patient_db::PatientRecord;
use serde_json::Value;

use super::PatientBody;
use crate::{
    error::ApiError,
    models::{HttpResponse, ResponseCode},
    AppState,
};

/// Path ids are matched as integers. Anything else cannot name a stored
/// patient and is reported as not found.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

/// GET /patients
pub async fn get_patients(State(state): State<AppState>) -> Result<HttpResponse, ApiError> {
    let patients = state.store.find_all().await?;

    Ok(HttpResponse::new(ResponseCode::Ok, "Patients retrieved").with_patients(patients))
}

/// GET /patients/:id
/// The record comes back as a one-element array.
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id)?;
    let patient = state
        .store
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::new(ResponseCode::Ok, "Patient retrieved").with_patients(vec![patient]))
}

/// POST /patients
/// Echoes the body with the id the database assigned. An `id` in the body is
/// neither stored nor echoed.
pub async fn create_patient(
    State(state): State<AppState>,
    PatientBody(body): PatientBody,
) -> Result<HttpResponse, ApiError> {
    let id = state.store.insert(&body).await?;

    let mut patient = body;
    patient.insert("id".to_string(), Value::from(id));
    tracing::info!(id, "Patient created");

    Ok(HttpResponse::new(ResponseCode::Created, "Patient created").with_patient(patient))
}

/// PUT /patients/:id
/// Overwrites every stored field. The response echoes the body with `id`
/// set to the path segment as given.
pub async fn update_patient(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    PatientBody(body): PatientBody,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&raw_id)?;
    if !state.store.update(id, &body).await? {
        return Err(ApiError::NotFound);
    }

    let mut patient: PatientRecord = body;
    patient.insert("id".to_string(), Value::String(raw_id));
    tracing::info!(id, "Patient updated");

    Ok(HttpResponse::new(ResponseCode::Ok, "Patient updated").with_patient(patient))
}

/// DELETE /patients/:id
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await? {
        return Err(ApiError::NotFound);
    }

    tracing::info!(id, "Patient deleted");
    Ok(HttpResponse::new(ResponseCode::Ok, "Patient deleted"))
}
