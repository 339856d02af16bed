//! Database side of the patient API: pool construction, the parameterized SQL
//! gateway, the configurable patient table schema and the repository the HTTP
//! handlers talk to.

pub mod config;
pub mod connection;
pub mod error;
pub mod gateway;
pub mod repository;
pub mod schema;

pub use config::DbConfig;
pub use connection::connect;
pub use error::DbError;
pub use gateway::{Gateway, SqlValue};
pub use repository::{PatientRepository, PatientStore};
pub use schema::PatientSchema;

/// A patient as it travels through the API: `id` plus whatever fields the
/// caller supplied.
pub type PatientRecord = serde_json::Map<String, serde_json::Value>;
