//! Table access for every content collection.
//!
//! All reads and writes go through [`CollectionStore`]. Each call is a single
//! round trip; callers re-list a collection after mutating it.

pub mod memory;
pub mod postgres;

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::schema::Schema;
use crate::Row;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error code the table API uses when a single-row query matched nothing.
pub const NO_ROWS_CODE: &str = "PGRST116";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no rows found")]
    NoRows,

    #[error("{message}")]
    Remote { code: String, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("invalid column name: {0}")]
    InvalidColumn(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Machine-readable code, matching the table API's codes where one exists.
    pub fn code(&self) -> &str {
        match self {
            StoreError::NoRows => NO_ROWS_CODE,
            StoreError::Remote { code, .. } => code,
            StoreError::Transport(_) => "transport",
            StoreError::Decode(_) => "decode",
            StoreError::UnknownTable(_) => "unknown_table",
            StoreError::InvalidColumn(_) => "invalid_column",
            StoreError::Database(_) => "database",
        }
    }

    pub fn is_no_rows(&self) -> bool {
        matches!(self, StoreError::NoRows)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Treat "no rows" as an empty result rather than a failure.
pub trait OptionalExt<T> {
    fn optional(self) -> StoreResult<Option<T>>;
}

impl<T> OptionalExt<T> for StoreResult<T> {
    fn optional(self) -> StoreResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(StoreError::NoRows) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column).unwrap_or(&Value::Null) == &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything in the table, in the schema's display order.
    pub fn for_schema(schema: &Schema) -> Self {
        Self::new().order_by(schema.order.column, schema.order.ascending)
    }

    /// Only the rows the public site may show.
    pub fn visible(schema: &Schema) -> Self {
        let query = Self::for_schema(schema);
        match schema.visibility {
            Some(column) => query.filter(Filter::eq(column, true)),
            None => query,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Rows matching `query`, in its order.
    async fn list(&self, table: &str, query: &ListQuery) -> StoreResult<Vec<Row>>;

    /// The row with `id`, or [`StoreError::NoRows`].
    async fn get_one(&self, table: &str, id: &str) -> StoreResult<Row>;

    /// The first row matching every filter, or [`StoreError::NoRows`].
    async fn find_one(&self, table: &str, filters: &[Filter]) -> StoreResult<Row>;

    /// Insert `row`; the store assigns `id` and `created_at`.
    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row>;

    /// Apply `patch` to the row with `id`. A missing row is [`StoreError::NoRows`].
    async fn update(&self, table: &str, id: &str, patch: Row) -> StoreResult<Row>;

    /// Delete the row with `id`. A missing row is [`StoreError::NoRows`].
    async fn remove(&self, table: &str, id: &str) -> StoreResult<()>;

    /// Atomically set `column` to `true` on `id` and `false` on every other
    /// row of the table.
    async fn set_single_active(&self, table: &str, column: &str, id: &str) -> StoreResult<()>;

    /// Cheap connectivity check.
    async fn ping(&self) -> StoreResult<()>;
}

/// Row id as a string, whatever its JSON representation.
pub fn row_id(row: &Row) -> Option<String> {
    match row.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Table and column names are interpolated into queries, so only plain
/// snake_case identifiers are accepted.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && name.len() <= 63
}

/// Ordering used when sorting rows in memory: nulls first, then booleans,
/// numbers and strings by value.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => rank(a).cmp(&rank(b)),
    }
}
