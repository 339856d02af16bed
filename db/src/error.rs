use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database configuration: {0}")]
    Config(String),

    #[error("Invalid patient schema: {0}")]
    InvalidSchema(String),

    #[error("Database query failed: {0}")]
    Query(#[from] sqlx::Error),
}
