use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};

use serde_json::Value;

use crate::error::DbError;

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(i64),
    Text(Option<String>),
    Json(Value),
}

/// Runs parameterized SQL against the shared pool.
///
/// Values are always bound, never spliced into the statement text. Every
/// failure comes back as [`DbError::Query`]; nothing is retried.
#[derive(Debug, Clone)]
pub struct Gateway {
    pool: PgPool,
}

impl Gateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All rows produced by `sql`.
    pub async fn fetch_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<PgRow>, DbError> {
        tracing::debug!(sql, params = params.len(), "fetch_all");
        Ok(bind(sql, params).fetch_all(&self.pool).await?)
    }

    /// At most one row.
    pub async fn fetch_optional(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Option<PgRow>, DbError> {
        tracing::debug!(sql, params = params.len(), "fetch_optional");
        Ok(bind(sql, params).fetch_optional(&self.pool).await?)
    }

    /// Exactly one row, e.g. from `INSERT ... RETURNING`.
    pub async fn fetch_one(&self, sql: &str, params: &[SqlValue]) -> Result<PgRow, DbError> {
        tracing::debug!(sql, params = params.len(), "fetch_one");
        Ok(bind(sql, params).fetch_one(&self.pool).await?)
    }

    /// Runs a mutation and returns the number of affected rows.
    pub async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        tracing::debug!(sql, params = params.len(), "execute");
        let result = bind(sql, params).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

fn bind<'q>(sql: &'q str, params: &[SqlValue]) -> Query<'q, Postgres, PgArguments> {
    params
        .iter()
        .fold(sqlx::query(sql), |query, param| match param {
            SqlValue::Int(value) => query.bind(*value),
            SqlValue::Text(value) => query.bind(value.clone()),
            SqlValue::Json(value) => query.bind(Json(value.clone())),
        })
}
