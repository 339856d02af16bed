use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;

use crate::error::DbError;
use crate::gateway::SqlValue;
use crate::PatientRecord;

pub const DEFAULT_TABLE: &str = "patients";
pub const DEFAULT_DATA_COLUMN: &str = "data";

/// Table layout of the stored patient.
///
/// The whole body (minus `id`) lives in one JSONB column, so any field the
/// caller sends is kept with its JSON type. Extra columns are optional text
/// copies of top-level body fields, written alongside the document for
/// querying in SQL; reads always come from the document.
///
/// Identifiers cannot be bound as parameters, so they are validated once here
/// and the five statements are rendered up front. `id` is a `BIGSERIAL` owned
/// by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSchema {
    table: String,
    data_column: String,
    columns: Vec<String>,
    select_all: String,
    select_by_id: String,
    insert: String,
    update: String,
    delete: String,
}

impl PatientSchema {
    pub fn new<I, S>(
        table: impl Into<String>,
        data_column: impl Into<String>,
        columns: I,
    ) -> Result<Self, DbError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = table.into();
        let data_column = data_column.into();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();

        if !is_identifier(&table) {
            return Err(DbError::InvalidSchema(format!("bad table name {table:?}")));
        }
        if !is_identifier(&data_column) || data_column.eq_ignore_ascii_case("id") {
            return Err(DbError::InvalidSchema(format!(
                "bad data column name {data_column:?}"
            )));
        }
        for (i, column) in columns.iter().enumerate() {
            if !is_identifier(column) {
                return Err(DbError::InvalidSchema(format!("bad column name {column:?}")));
            }
            if column.eq_ignore_ascii_case("id") {
                return Err(DbError::InvalidSchema("`id` is assigned by the database".into()));
            }
            if column.eq_ignore_ascii_case(&data_column)
                || columns[..i].iter().any(|c| c.eq_ignore_ascii_case(column))
            {
                return Err(DbError::InvalidSchema(format!("duplicate column {column:?}")));
            }
        }

        let written: Vec<&str> = std::iter::once(data_column.as_str())
            .chain(columns.iter().map(String::as_str))
            .collect();
        let column_list = written.join(", ");
        let placeholders = (1..=written.len())
            .map(|n| format!("${n}"))
            .collect::<Vec<_>>()
            .join(", ");
        let assignments = written
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c} = ${}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Self {
            select_all: format!("SELECT id, {data_column} FROM {table} ORDER BY id"),
            select_by_id: format!("SELECT id, {data_column} FROM {table} WHERE id = $1"),
            insert: format!(
                "INSERT INTO {table} ({column_list}) VALUES ({placeholders}) RETURNING id"
            ),
            update: format!(
                "UPDATE {table} SET {assignments} WHERE id = ${}",
                written.len() + 1
            ),
            delete: format!("DELETE FROM {table} WHERE id = $1"),
            table,
            data_column,
            columns,
        })
    }

    /// Reads `PATIENT_TABLE`, `PATIENT_DATA_COLUMN` and the comma separated
    /// `PATIENT_COLUMNS` (empty by default).
    pub fn from_env() -> Result<Self, DbError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, DbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let table = lookup("PATIENT_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());
        let data_column =
            lookup("PATIENT_DATA_COLUMN").unwrap_or_else(|| DEFAULT_DATA_COLUMN.to_string());
        let columns = lookup("PATIENT_COLUMNS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Self::new(table, data_column, columns)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn select_all_sql(&self) -> &str {
        &self.select_all
    }

    pub fn select_by_id_sql(&self) -> &str {
        &self.select_by_id
    }

    pub fn insert_sql(&self) -> &str {
        &self.insert
    }

    /// Document and extra columns first, `id` last.
    pub fn update_sql(&self) -> &str {
        &self.update
    }

    pub fn delete_sql(&self) -> &str {
        &self.delete
    }

    /// Bind values in statement order: the body without `id` as the JSONB
    /// document, then one text value per extra column (missing or `null`
    /// fields become NULL, non-string scalars their JSON text).
    pub fn values_from(&self, patient: &PatientRecord) -> Vec<SqlValue> {
        let document: PatientRecord = patient
            .iter()
            .filter(|(key, _)| key.as_str() != "id")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        std::iter::once(SqlValue::Json(Value::Object(document)))
            .chain(self.columns.iter().map(|column| {
                SqlValue::Text(match patient.get(column) {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                })
            }))
            .collect()
    }

    /// Maps a row selected with one of this schema's statements.
    pub fn record_from_row(&self, row: &PgRow) -> Result<PatientRecord, DbError> {
        let id: i64 = row.try_get("id")?;
        let Json(document): Json<Value> = row.try_get(self.data_column.as_str())?;
        record_from_parts(id, document)
    }
}

impl Default for PatientSchema {
    fn default() -> Self {
        match Self::new(DEFAULT_TABLE, DEFAULT_DATA_COLUMN, Vec::<String>::new()) {
            Ok(schema) => schema,
            Err(e) => unreachable!("default patient schema is valid: {e}"),
        }
    }
}

/// The stored document with the row id added. A document that is not an
/// object means the row was written by something else.
pub fn record_from_parts(id: i64, document: Value) -> Result<PatientRecord, DbError> {
    let mut record = match document {
        Value::Object(fields) => fields,
        Value::Null => PatientRecord::new(),
        other => {
            return Err(DbError::InvalidSchema(format!(
                "patient {id} holds a non-object document: {other}"
            )))
        }
    };
    record.insert("id".to_string(), Value::from(id));
    Ok(record)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
