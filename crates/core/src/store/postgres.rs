//! Direct PostgreSQL access to the content tables.
//!
//! Rows are read with `to_jsonb` and written through
//! `jsonb_populate_record`, so the store never needs per-table structs. Table
//! names are restricted to the known content tables and column names to
//! plain identifiers.
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::Postgres;
use sqlx::types::Json;
use sqlx::{PgPool, QueryBuilder};

use super::{is_identifier, CollectionStore, Filter, ListQuery, StoreError, StoreResult};
use crate::schema::EntityKind;
use crate::Row;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn check_table(table: &str) -> StoreResult<&str> {
    match EntityKind::from_table(table) {
        Some(kind) => Ok(kind.table()),
        None => Err(StoreError::UnknownTable(table.to_string())),
    }
}

fn check_column(column: &str) -> StoreResult<&str> {
    if is_identifier(column) {
        Ok(column)
    } else {
        Err(StoreError::InvalidColumn(column.to_string()))
    }
}

fn into_row(value: Json<Value>) -> StoreResult<Row> {
    match value.0 {
        Value::Object(row) => Ok(row),
        other => Err(StoreError::Decode(format!("expected a row object, got {other}"))),
    }
}

/// Writable columns of `row`, excluding the immutable id.
fn writable_columns(row: &Row) -> StoreResult<Vec<&str>> {
    row.keys()
        .filter(|column| column.as_str() != "id")
        .map(|column| check_column(column))
        .collect()
}

fn push_filters<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    filters: &'a [Filter],
) -> StoreResult<()> {
    for (index, filter) in filters.iter().enumerate() {
        check_column(&filter.column)?;
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        builder.push("(to_jsonb(t) -> ");
        builder.push_bind(filter.column.as_str());
        builder.push(") = ");
        builder.push_bind(Json(&filter.value));
    }
    Ok(())
}

pub(crate) fn select_query<'a>(
    table: &str,
    query: &'a ListQuery,
) -> StoreResult<QueryBuilder<'a, Postgres>> {
    let table = check_table(table)?;
    let mut builder = QueryBuilder::new(format!("SELECT to_jsonb(t) FROM {table} AS t"));
    push_filters(&mut builder, &query.filters)?;
    if let Some(order) = &query.order {
        let column = check_column(&order.column)?;
        let direction = if order.ascending { "ASC" } else { "DESC" };
        builder.push(format!(" ORDER BY t.{column} {direction} NULLS LAST"));
    }
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit as i64);
    }
    Ok(builder)
}

pub(crate) fn insert_query(table: &str, row: &Row) -> StoreResult<QueryBuilder<'static, Postgres>> {
    let table = check_table(table)?;
    let columns = writable_columns(row)?;
    if columns.is_empty() {
        return Ok(QueryBuilder::new(format!(
            "INSERT INTO {table} AS t DEFAULT VALUES RETURNING to_jsonb(t)"
        )));
    }
    let columns = columns.join(", ");
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {table} AS t ({columns}) \
         SELECT {columns} FROM jsonb_populate_record(NULL::{table}, "
    ));
    builder.push_bind(Json(Value::Object(row.clone())));
    builder.push(") RETURNING to_jsonb(t)");
    Ok(builder)
}

pub(crate) fn update_query(
    table: &str,
    id: &str,
    patch: &Row,
) -> StoreResult<Option<QueryBuilder<'static, Postgres>>> {
    let table = check_table(table)?;
    let columns = writable_columns(patch)?;
    if columns.is_empty() {
        return Ok(None);
    }
    let assignments = columns
        .iter()
        .map(|column| format!("{column} = r.{column}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut builder = QueryBuilder::new(format!(
        "UPDATE {table} AS t SET {assignments} FROM jsonb_populate_record(NULL::{table}, "
    ));
    builder.push_bind(Json(Value::Object(patch.clone())));
    builder.push(") AS r WHERE t.id::text = ");
    builder.push_bind(id.to_string());
    builder.push(" RETURNING to_jsonb(t)");
    Ok(Some(builder))
}

#[async_trait]
impl CollectionStore for PgStore {
    async fn list(&self, table: &str, query: &ListQuery) -> StoreResult<Vec<Row>> {
        let mut builder = select_query(table, query)?;
        let rows = builder
            .build_query_scalar::<Json<Value>>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(into_row).collect()
    }

    async fn get_one(&self, table: &str, id: &str) -> StoreResult<Row> {
        let table = check_table(table)?;
        let row: Option<Json<Value>> = sqlx::query_scalar(&format!(
            "SELECT to_jsonb(t) FROM {table} AS t WHERE t.id::text = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_row).unwrap_or(Err(StoreError::NoRows))
    }

    async fn find_one(&self, table: &str, filters: &[Filter]) -> StoreResult<Row> {
        let query = ListQuery {
            filters: filters.to_vec(),
            order: None,
            limit: Some(1),
        };
        self.list(table, &query)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NoRows)
    }

    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        let mut builder = insert_query(table, &row)?;
        let saved = builder
            .build_query_scalar::<Json<Value>>()
            .fetch_one(&self.pool)
            .await?;
        into_row(saved)
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> StoreResult<Row> {
        let Some(mut builder) = update_query(table, id, &patch)? else {
            return self.get_one(table, id).await;
        };
        let saved = builder
            .build_query_scalar::<Json<Value>>()
            .fetch_optional(&self.pool)
            .await?;
        saved.map(into_row).unwrap_or(Err(StoreError::NoRows))
    }

    async fn remove(&self, table: &str, id: &str) -> StoreResult<()> {
        let table = check_table(table)?;
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id::text = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NoRows);
        }
        Ok(())
    }

    async fn set_single_active(&self, table: &str, column: &str, id: &str) -> StoreResult<()> {
        let table = check_table(table)?;
        let column = check_column(column)?;
        let mut tx = self.pool.begin().await?;

        // Serialize activations per table; the partial unique index would
        // otherwise reject the loser of a concurrent swap.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(format!("{table}.{column}"))
            .execute(&mut *tx)
            .await?;

        let target = sqlx::query(&format!("SELECT 1 FROM {table} WHERE id::text = $1 FOR UPDATE"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if target.is_none() {
            return Err(StoreError::NoRows);
        }

        sqlx::query(&format!(
            "UPDATE {table} SET {column} = false WHERE {column} AND id::text <> $1"
        ))
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!("UPDATE {table} SET {column} = true WHERE id::text = $1"))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(table, column, id, "single active row swapped");
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
