//! Tables in which at most one row is "the current one" (discounts, banners).
use serde_json::Value;
use thiserror::Error;

use crate::schema::EntityKind;
use crate::store::{CollectionStore, Filter, OptionalExt, StoreError};
use crate::Row;

#[derive(Debug, Error)]
pub enum ActiveError {
    #[error("{0} rows cannot be activated")]
    Unsupported(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn active_column(kind: EntityKind) -> Result<&'static str, ActiveError> {
    kind.schema()
        .single_active
        .ok_or(ActiveError::Unsupported(kind.label()))
}

/// Make `id` the only active row of `kind`'s table. Repeating the call with
/// the same id leaves the table unchanged.
pub async fn set_active(
    store: &dyn CollectionStore,
    kind: EntityKind,
    id: &str,
) -> Result<(), ActiveError> {
    let column = active_column(kind)?;
    store.set_single_active(kind.table(), column, id).await?;
    tracing::info!(table = kind.table(), id, "row activated");
    Ok(())
}

/// Clear the active flag on `id`, leaving the table with no active row.
pub async fn deactivate(
    store: &dyn CollectionStore,
    kind: EntityKind,
    id: &str,
) -> Result<Row, ActiveError> {
    let column = active_column(kind)?;
    let mut patch = Row::new();
    patch.insert(column.to_string(), Value::Bool(false));
    let row = store.update(kind.table(), id, patch).await?;
    tracing::info!(table = kind.table(), id, "row deactivated");
    Ok(row)
}

/// The currently active row, or `None` when nothing is configured yet.
pub async fn active_row(
    store: &dyn CollectionStore,
    kind: EntityKind,
) -> Result<Option<Row>, ActiveError> {
    let column = active_column(kind)?;
    Ok(store
        .find_one(kind.table(), &[Filter::eq(column, true)])
        .await
        .optional()?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::{row_id, MemoryStore};

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    async fn discounts() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .seed(
                "discounts",
                vec![
                    row(json!({ "id": "a", "is_active": true })),
                    row(json!({ "id": "b", "is_active": false })),
                    row(json!({ "id": "c", "is_active": false })),
                ],
            )
            .await;
        store
    }

    async fn active_ids(store: &MemoryStore) -> Vec<String> {
        store
            .rows("discounts")
            .await
            .iter()
            .filter(|row| row["is_active"] == json!(true))
            .filter_map(row_id)
            .collect()
    }

    #[tokio::test]
    async fn activating_b_deactivates_a_only() {
        let store = discounts().await;
        set_active(&store, EntityKind::Discount, "b").await.unwrap();
        assert_eq!(active_ids(&store).await, vec!["b"]);
        let c = store.get_one("discounts", "c").await.unwrap();
        assert_eq!(c["is_active"], json!(false));
    }

    #[tokio::test]
    async fn activation_is_idempotent() {
        let store = discounts().await;
        set_active(&store, EntityKind::Discount, "c").await.unwrap();
        let once = store.rows("discounts").await;
        set_active(&store, EntityKind::Discount, "c").await.unwrap();
        assert_eq!(store.rows("discounts").await, once);
        assert_eq!(active_ids(&store).await, vec!["c"]);
    }

    #[tokio::test]
    async fn active_row_and_deactivate() {
        let store = discounts().await;
        let active = active_row(&store, EntityKind::Discount).await.unwrap();
        assert_eq!(active.and_then(|row| row_id(&row)).as_deref(), Some("a"));

        deactivate(&store, EntityKind::Discount, "a").await.unwrap();
        assert!(active_row(&store, EntityKind::Discount).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unsupported_kind() {
        let store = MemoryStore::new();
        assert!(matches!(
            set_active(&store, EntityKind::Product, "x").await,
            Err(ActiveError::Unsupported("Product"))
        ));
    }
}
