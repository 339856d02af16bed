use async_trait::async_trait;
use sqlx::Row;

use crate::error::DbError;
use crate::gateway::{Gateway, SqlValue};
use crate::schema::PatientSchema;
use crate::PatientRecord;

/// Storage operations behind the patient endpoints.
///
/// The HTTP layer only sees this trait, so the SQL-backed repository can be
/// swapped for another implementation (tests use an in-memory one).
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Every stored patient, ordered by id.
    async fn find_all(&self) -> Result<Vec<PatientRecord>, DbError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PatientRecord>, DbError>;

    /// Inserts a patient and returns the id the database assigned.
    async fn insert(&self, patient: &PatientRecord) -> Result<i64, DbError>;

    /// Overwrites every stored field of patient `id`. Returns `false` when no
    /// such patient exists, in which case nothing was written.
    async fn update(&self, id: i64, patient: &PatientRecord) -> Result<bool, DbError>;

    /// Returns `false` when no such patient exists.
    async fn delete(&self, id: i64) -> Result<bool, DbError>;
}

/// Patient repository over the SQL gateway
pub struct PatientRepository {
    gateway: Gateway,
    schema: PatientSchema,
}

impl PatientRepository {
    /// Create new repository instance
    pub fn new(gateway: Gateway, schema: PatientSchema) -> Self {
        Self { gateway, schema }
    }
}

#[async_trait]
impl PatientStore for PatientRepository {
    async fn find_all(&self) -> Result<Vec<PatientRecord>, DbError> {
        let rows = self
            .gateway
            .fetch_all(self.schema.select_all_sql(), &[])
            .await?;

        rows.iter()
            .map(|row| self.schema.record_from_row(row))
            .collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PatientRecord>, DbError> {
        let row = self
            .gateway
            .fetch_optional(self.schema.select_by_id_sql(), &[SqlValue::Int(id)])
            .await?;

        row.map(|row| self.schema.record_from_row(&row)).transpose()
    }

    async fn insert(&self, patient: &PatientRecord) -> Result<i64, DbError> {
        let values = self.schema.values_from(patient);
        let row = self
            .gateway
            .fetch_one(self.schema.insert_sql(), &values)
            .await?;

        let id: i64 = row.try_get("id")?;
        tracing::info!(id, table = self.schema.table(), "Patient inserted");
        Ok(id)
    }

    // A single conditional UPDATE: the affected-row count is the existence
    // check, so a concurrent delete cannot slip between check and write.
    async fn update(&self, id: i64, patient: &PatientRecord) -> Result<bool, DbError> {
        let mut values = self.schema.values_from(patient);
        values.push(SqlValue::Int(id));

        let affected = self
            .gateway
            .execute(self.schema.update_sql(), &values)
            .await?;

        tracing::info!(id, affected, "Patient update");
        Ok(affected > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let affected = self
            .gateway
            .execute(self.schema.delete_sql(), &[SqlValue::Int(id)])
            .await?;

        tracing::info!(id, affected, "Patient delete");
        Ok(affected > 0)
    }
}
