pub mod admin;
pub mod auth;
pub mod health;
pub mod site;

use axum::Router;
use dairy_cms_core::locale::Language;
use dairy_cms_core::notify::{Level, Notifier, Toast, ToastBus};
use dairy_cms_core::schema::EntityKind;
use dairy_cms_core::store::{ListQuery, OptionalExt, StoreResult};
use dairy_cms_core::view::messages;
use dairy_cms_core::Row;
use serde::Serialize;

use crate::error::ApiError;
use crate::extract::Lang;
use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(site::routes())
        .merge(auth::routes())
        .merge(admin::routes(state.clone()))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(Lang(lang): Lang) -> ApiError {
    ApiError::NotFound(messages::page_not_found(lang).to_string())
}

/// Response envelope: the view model plus the toasts raised building it.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub lang: Language,
    pub dir: &'static str,
    #[serde(flatten)]
    pub data: T,
    pub toasts: Vec<Toast>,
}

impl<T> Page<T> {
    pub fn new(lang: Language, data: T, toasts: Vec<Toast>) -> Self {
        Self {
            lang,
            dir: lang.dir(),
            data,
            toasts,
        }
    }
}

/// Rows of `kind`, or an empty list plus an error toast.
pub(crate) async fn fetch_rows(
    state: &AppState,
    kind: EntityKind,
    query: &ListQuery,
    bus: &ToastBus,
) -> Vec<Row> {
    match state.store().list(kind.table(), query).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(table = kind.table(), error = %err, "fetch failed");
            bus.notify(Level::Error, err.to_string());
            Vec::new()
        }
    }
}

/// One row of `kind`. Missing rows are `None` without a toast.
pub(crate) async fn fetch_row(
    state: &AppState,
    kind: EntityKind,
    id: &str,
    bus: &ToastBus,
) -> Option<Row> {
    match state.store().get_one(kind.table(), id).await.optional() {
        Ok(row) => row,
        Err(err) => {
            tracing::warn!(table = kind.table(), id, error = %err, "fetch failed");
            bus.notify(Level::Error, err.to_string());
            None
        }
    }
}

/// The single settings row, `None` when none has been saved yet.
pub(crate) async fn find_settings(state: &AppState) -> StoreResult<Option<Row>> {
    let query = ListQuery::for_schema(EntityKind::SiteSettings.schema()).limit(1);
    let rows = state.store().list(EntityKind::SiteSettings.table(), &query).await?;
    Ok(rows.into_iter().next())
}

/// The settings row for public pages; lookup failures become a toast.
pub(crate) async fn fetch_settings(state: &AppState, bus: &ToastBus) -> Option<Row> {
    match find_settings(state).await {
        Ok(row) => row,
        Err(err) => {
            tracing::warn!(table = EntityKind::SiteSettings.table(), error = %err, "fetch failed");
            bus.notify(Level::Error, err.to_string());
            None
        }
    }
}
