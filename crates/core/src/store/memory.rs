use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    compare_values, is_identifier, row_id, CollectionStore, Filter, ListQuery, StoreError,
    StoreResult,
};
use crate::Row;

/// Process-local table store. Backs the `memory` backend and the tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, Vec<Row>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of `table`, keeping the given ids.
    pub async fn seed(&self, table: &str, rows: Vec<Row>) {
        let rows = rows.into_iter().map(stamp).collect();
        self.tables.write().await.insert(table.to_string(), rows);
    }

    /// Snapshot of a table in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

fn check_table(table: &str) -> StoreResult<()> {
    if is_identifier(table) {
        Ok(())
    } else {
        Err(StoreError::UnknownTable(table.to_string()))
    }
}

/// Fill in the columns the database would assign.
fn stamp(mut row: Row) -> Row {
    if row_id(&row).is_none() {
        row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
    }
    if !row.contains_key("created_at") {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        row.insert("created_at".into(), Value::String(now));
    }
    row
}

fn matches_all(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| filter.matches(row))
}

fn has_id(row: &Row, id: &str) -> bool {
    row_id(row).as_deref() == Some(id)
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn list(&self, table: &str, query: &ListQuery) -> StoreResult<Vec<Row>> {
        check_table(table)?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_all(row, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            // Stable sort: ties keep insertion order.
            rows.sort_by(|a, b| {
                let a = a.get(&order.column).unwrap_or(&Value::Null);
                let b = b.get(&order.column).unwrap_or(&Value::Null);
                let ordering = compare_values(a, b);
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn get_one(&self, table: &str, id: &str) -> StoreResult<Row> {
        check_table(table)?;
        self.tables
            .read()
            .await
            .get(table)
            .and_then(|rows| rows.iter().find(|row| has_id(row, id)).cloned())
            .ok_or(StoreError::NoRows)
    }

    async fn find_one(&self, table: &str, filters: &[Filter]) -> StoreResult<Row> {
        check_table(table)?;
        self.tables
            .read()
            .await
            .get(table)
            .and_then(|rows| rows.iter().find(|row| matches_all(row, filters)).cloned())
            .ok_or(StoreError::NoRows)
    }

    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        check_table(table)?;
        let row = stamp(row);
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> StoreResult<Row> {
        check_table(table)?;
        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|row| has_id(row, id)))
            .ok_or(StoreError::NoRows)?;
        for (column, value) in patch {
            if column != "id" {
                row.insert(column, value);
            }
        }
        Ok(row.clone())
    }

    async fn remove(&self, table: &str, id: &str) -> StoreResult<()> {
        check_table(table)?;
        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(table).ok_or(StoreError::NoRows)?;
        let position = rows
            .iter()
            .position(|row| has_id(row, id))
            .ok_or(StoreError::NoRows)?;
        rows.remove(position);
        Ok(())
    }

    async fn set_single_active(&self, table: &str, column: &str, id: &str) -> StoreResult<()> {
        check_table(table)?;
        if !is_identifier(column) {
            return Err(StoreError::InvalidColumn(column.to_string()));
        }
        // One write guard covers both halves of the swap.
        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(table).ok_or(StoreError::NoRows)?;
        if !rows.iter().any(|row| has_id(row, id)) {
            return Err(StoreError::NoRows);
        }
        for row in rows.iter_mut() {
            let active = has_id(row, id);
            row.insert(column.to_string(), Value::Bool(active));
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
