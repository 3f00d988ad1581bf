//! Add/edit dialog workflow shared by every admin management page.
//!
//! A [`FormController`] owns the page's current list, the dialog mode and the
//! in-progress form values. Submitting validates, uploads a chosen image,
//! persists, notifies, closes the dialog and re-lists the collection.

pub mod values;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::active::{self, ActiveError};
use crate::media::{self, PreviewWarning};
use crate::notify::{Level, Notifier};
use crate::schema::{validate, EntityKind, FieldErrors, Schema, ORDER_INDEX};
use crate::storage::{ImageUpload, ObjectStorage, StorageError};
use crate::store::{row_id, CollectionStore, ListQuery, StoreError};
use crate::Row;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "row", rename_all = "snake_case")]
pub enum FormMode {
    Closed,
    Add,
    Edit(Row),
}

/// Blocking yes/no prompt shown before destructive actions.
pub trait Confirm: Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool + Sync> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no dialog is open")]
    Closed,

    #[error("please correct the highlighted fields")]
    Invalid(FieldErrors),

    #[error("deletion was cancelled")]
    Cancelled,

    #[error("image upload failed: {0}")]
    Upload(#[from] StorageError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Active(#[from] ActiveError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitOutcome {
    pub row: Row,
    pub warnings: Vec<PreviewWarning>,
}

pub struct FormController {
    kind: EntityKind,
    store: Arc<dyn CollectionStore>,
    storage: Arc<dyn ObjectStorage>,
    notifier: Arc<dyn Notifier>,
    items: Vec<Row>,
    mode: FormMode,
    values: Row,
    errors: FieldErrors,
}

impl FormController {
    pub fn new(
        kind: EntityKind,
        store: Arc<dyn CollectionStore>,
        storage: Arc<dyn ObjectStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            kind,
            store,
            storage,
            notifier,
            items: Vec::new(),
            mode: FormMode::Closed,
            values: Row::new(),
            errors: FieldErrors::default(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    fn schema(&self) -> &'static Schema {
        self.kind.schema()
    }

    pub fn items(&self) -> &[Row] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Row> {
        self.items
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.mode, FormMode::Closed)
    }

    pub fn values(&self) -> &Row {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Re-fetch the collection. A failure is reported and leaves the list
    /// empty.
    pub async fn refresh(&mut self) -> &[Row] {
        let schema = self.schema();
        match self
            .store
            .list(schema.table, &ListQuery::for_schema(schema))
            .await
        {
            Ok(rows) => self.items = rows,
            Err(err) => {
                tracing::warn!(table = schema.table, error = %err, "failed to fetch collection");
                self.notifier.notify(Level::Error, err.to_string());
                self.items = Vec::new();
            }
        }
        &self.items
    }

    /// `max(order_index) + 1` over the current list, or 0 when it is empty.
    /// `None` for collections without manual ordering.
    pub fn next_order_index(&self) -> Option<i64> {
        if !self.schema().is_ordered() {
            return None;
        }
        let next = self
            .items
            .iter()
            .filter_map(|row| row.get(ORDER_INDEX).and_then(Value::as_i64))
            .max()
            .map_or(0, |max| max + 1);
        Some(next)
    }

    pub fn open_add(&mut self) {
        self.values = values::defaults(self.schema(), self.next_order_index());
        self.errors = FieldErrors::default();
        self.mode = FormMode::Add;
    }

    pub fn open_edit(&mut self, row: Row) {
        self.values = values::from_row(self.schema(), &row);
        self.errors = FieldErrors::default();
        self.mode = FormMode::Edit(row);
    }

    pub fn close(&mut self) {
        self.mode = FormMode::Closed;
        self.values = Row::new();
        self.errors = FieldErrors::default();
    }

    /// Validate and persist `values`. On failure the dialog stays open with
    /// the submitted values preserved. The exclusive borrow keeps a second
    /// submit from starting while this one is in flight.
    pub async fn submit(
        &mut self,
        values: Row,
        upload: Option<ImageUpload>,
    ) -> Result<SubmitOutcome, SubmitError> {
        let mut values = values;
        match &self.mode {
            FormMode::Closed => return Err(SubmitError::Closed),
            FormMode::Add => {
                let missing = values.get(ORDER_INDEX).map_or(true, |value| {
                    value.is_null() || value.as_str().is_some_and(|s| s.trim().is_empty())
                });
                if missing {
                    if let Some(next) = self.next_order_index() {
                        values.insert(ORDER_INDEX.to_string(), Value::from(next));
                    }
                }
            }
            FormMode::Edit(_) => {}
        }
        self.values = values;

        let row = match validate(self.schema(), &self.values) {
            Ok(row) => row,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(SubmitError::Invalid(errors));
            }
        };
        self.errors = FieldErrors::default();

        let result = self.persist(row, upload).await;

        let label = self.kind.label();
        match result {
            Ok(saved) => {
                let verb = match self.mode {
                    FormMode::Add => "created",
                    _ => "updated",
                };
                self.notifier
                    .notify(Level::Success, format!("{label} {verb} successfully"));
                let id = row_id(&saved);
                tracing::info!(table = self.schema().table, id = ?id, verb, "row saved");
                let warnings = media::preview_warnings(self.schema(), &saved);
                self.close();
                self.refresh().await;
                Ok(SubmitOutcome {
                    row: saved,
                    warnings,
                })
            }
            Err(err) => {
                tracing::warn!(table = self.schema().table, error = %err, "save failed");
                let message = format!("Failed to save {}: {err}", label.to_lowercase());
                self.notifier.notify(Level::Error, message);
                Err(err)
            }
        }
    }

    async fn persist(
        &self,
        mut row: Row,
        upload: Option<ImageUpload>,
    ) -> Result<Row, SubmitError> {
        let schema = self.schema();
        if let (Some(upload), Some(column)) = (upload, schema.image_field) {
            let path = media::upload_path(schema.table, &upload.file_name);
            let url = self.storage.upload(&path, &upload).await?;
            row.insert(column.to_string(), Value::String(url));
        }
        let saved = match &self.mode {
            FormMode::Add => self.store.insert(schema.table, row).await?,
            FormMode::Edit(existing) => {
                let id = row_id(existing).ok_or(StoreError::NoRows)?;
                self.store.update(schema.table, &id, row).await?
            }
            FormMode::Closed => return Err(SubmitError::Closed),
        };
        Ok(saved)
    }

    /// Ask for confirmation, delete `id` and re-list. A failed delete leaves
    /// the list untouched.
    pub async fn delete(&mut self, id: &str, confirm: &dyn Confirm) -> Result<(), SubmitError> {
        let label = self.kind.label();
        let prompt = format!("Are you sure you want to delete this {}?", label.to_lowercase());
        if !confirm.confirm(&prompt) {
            return Err(SubmitError::Cancelled);
        }
        match self.store.remove(self.schema().table, id).await {
            Ok(()) => {
                tracing::info!(table = self.schema().table, id, "row deleted");
                self.notifier
                    .notify(Level::Success, format!("{label} deleted successfully"));
                self.refresh().await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(table = self.schema().table, id, error = %err, "delete failed");
                let message = format!("Failed to delete {}: {err}", label.to_lowercase());
                self.notifier.notify(Level::Error, message);
                Err(err.into())
            }
        }
    }

    /// Make `id` the single active row and re-list.
    pub async fn activate(&mut self, id: &str) -> Result<(), SubmitError> {
        let label = self.kind.label();
        match active::set_active(self.store.as_ref(), self.kind, id).await {
            Ok(()) => {
                self.notifier
                    .notify(Level::Success, format!("{label} is now active"));
                self.refresh().await;
                Ok(())
            }
            Err(err) => {
                let message = format!("Failed to activate {}: {err}", label.to_lowercase());
                self.notifier.notify(Level::Error, message);
                Err(err.into())
            }
        }
    }

    pub async fn deactivate(&mut self, id: &str) -> Result<(), SubmitError> {
        let label = self.kind.label();
        match active::deactivate(self.store.as_ref(), self.kind, id).await {
            Ok(_) => {
                self.notifier
                    .notify(Level::Success, format!("{label} deactivated"));
                self.refresh().await;
                Ok(())
            }
            Err(err) => {
                self.notifier.notify(
                    Level::Error,
                    format!("Failed to deactivate {}: {err}", label.to_lowercase()),
                );
                Err(err.into())
            }
        }
    }
}
