//! HTTP side of the patient API: the response envelope, the CRUD handlers,
//! the router and the process bootstrap.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

use axum::{
    extract::Request,
    http::header,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use patient_db::{DbConfig, Gateway, PatientRepository, PatientSchema, PatientStore};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::ServerConfig;

/// Shared by every handler. The store wraps the pool built at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PatientStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self { store }
    }
}

/// Routes plus middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/patients",
            get(handlers::get_patients)
                .post(handlers::create_patient)
                .fallback(handlers::route_not_found),
        )
        .route(
            "/patients/:id",
            get(handlers::get_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient)
                .fallback(handlers::route_not_found),
        )
        .route(
            "/",
            get(handlers::welcome).fallback(handlers::route_not_found),
        )
        .fallback(handlers::route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // Any origin is allowed. Not for production.
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(log_request)),
        )
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_owned();

    tracing::info!(
        method = %request.method(),
        uri = %request.uri(),
        user_agent = %user_agent,
        "Incoming request"
    );

    next.run(request).await
}

/// Reads configuration, builds the pool once and serves until the process
/// is killed.
pub async fn run() -> anyhow::Result<()> {
    let server = ServerConfig::from_env()?;
    let db_config = DbConfig::from_env()?;
    let schema = PatientSchema::from_env()?;

    let pool = patient_db::connect(&db_config).await?;
    let store = PatientRepository::new(Gateway::new(pool), schema);
    let state = AppState::new(Arc::new(store));

    let listener = tokio::net::TcpListener::bind(server.bind_addr()).await?;
    tracing::info!("application is running on: {}", listener.local_addr()?);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
