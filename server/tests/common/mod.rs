use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use patient_api::{app, AppState};
use patient_db::{DbError, PatientRecord, PatientStore};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Keeps patients in a map, assigning ids like a serial column would.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    rows: BTreeMap<i64, PatientRecord>,
    writes: usize,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }

    pub fn writes(&self) -> usize {
        self.inner.lock().unwrap().writes
    }
}

fn without_id(patient: &PatientRecord) -> PatientRecord {
    patient
        .iter()
        .filter(|(key, _)| key.as_str() != "id")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn with_id(id: i64, fields: &PatientRecord) -> PatientRecord {
    let mut record = fields.clone();
    record.insert("id".to_string(), Value::from(id));
    record
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<PatientRecord>, DbError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().map(|(id, row)| with_id(*id, row)).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PatientRecord>, DbError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.get(&id).map(|row| with_id(id, row)))
    }

    async fn insert(&self, patient: &PatientRecord) -> Result<i64, DbError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.insert(id, without_id(patient));
        inner.writes += 1;
        Ok(id)
    }

    async fn update(&self, id: i64, patient: &PatientRecord) -> Result<bool, DbError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.rows.contains_key(&id) {
            return Ok(false);
        }
        inner.rows.insert(id, without_id(patient));
        inner.writes += 1;
        Ok(true)
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.rows.remove(&id).is_some();
        if removed {
            inner.writes += 1;
        }
        Ok(removed)
    }
}

/// Fails every call the way an unreachable database would.
pub struct FailingStore;

#[async_trait]
impl PatientStore for FailingStore {
    async fn find_all(&self) -> Result<Vec<PatientRecord>, DbError> {
        Err(DbError::Query(sqlx::Error::PoolTimedOut))
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<PatientRecord>, DbError> {
        Err(DbError::Query(sqlx::Error::PoolTimedOut))
    }

    async fn insert(&self, _patient: &PatientRecord) -> Result<i64, DbError> {
        Err(DbError::Query(sqlx::Error::PoolTimedOut))
    }

    async fn update(&self, _id: i64, _patient: &PatientRecord) -> Result<bool, DbError> {
        Err(DbError::Query(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, _id: i64) -> Result<bool, DbError> {
        Err(DbError::Query(sqlx::Error::PoolTimedOut))
    }
}

pub fn memory_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let router = app(AppState::new(store.clone()));
    (router, store)
}

pub fn failing_app() -> Router {
    app(AppState::new(Arc::new(FailingStore)))
}

/// Sends one request through the router and returns the status with the
/// decoded JSON body.
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => Request::builder().method(method).uri(uri).body(Body::empty()),
    }
    .unwrap_or_else(|err| panic!("failed to build request: {err}"));

    send_request(router, request).await
}

pub async fn send_request(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = match router.clone().oneshot(request).await {
        Ok(response) => response,
        Err(err) => match err {},
    };
    let status = response.status();

    let bytes = match to_bytes(response.into_body(), 1024 * 1024).await {
        Ok(bytes) => bytes,
        Err(err) => panic!("failed to read response body: {err}"),
    };
    let body = match serde_json::from_slice(&bytes) {
        Ok(body) => body,
        Err(err) => panic!("response body is not JSON: {err}"),
    };

    (status, body)
}
