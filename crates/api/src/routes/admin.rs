//! Auth-gated content management.
//!
//! Each request builds a [`FormController`] for the collection, drives one
//! transition and returns the resulting state together with the toasts it
//! raised.
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use dairy_cms_core::form::{FormController, FormMode, SubmitError};
use dairy_cms_core::locale::Language;
use dairy_cms_core::media::{self, PreviewWarning};
use dairy_cms_core::notify::{drain, Level, Notifier, Toast, ToastBus};
use dairy_cms_core::schema::{EntityKind, FieldErrors, FieldKind, Schema};
use dairy_cms_core::store::{ListQuery, OptionalExt, StoreError};
use dairy_cms_core::view::{self, messages, TableView};
use dairy_cms_core::Row;
use serde::Serialize;
use serde_json::Map;
use tokio::sync::broadcast;

use super::{fetch_rows, find_settings, Page};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ConfirmQuery, CurrentAdmin, FormPayload, Lang};
use crate::middleware::auth::require_admin;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/admin", get(dashboard))
        .route("/v1/admin/content", get(content))
        .route("/v1/admin/settings", get(settings).put(save_settings))
        .route("/v1/admin/{slug}", get(list).post(create))
        .route("/v1/admin/{slug}/new", get(new_form))
        .route("/v1/admin/{slug}/{id}", put(update).delete(remove))
        .route("/v1/admin/{slug}/{id}/edit", get(edit_form))
        .route("/v1/admin/{slug}/{id}/activate", post(activate))
        .route("/v1/admin/{slug}/{id}/deactivate", post(deactivate))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// Collections managed under `/v1/admin/{slug}`. Settings has its own
/// singleton routes.
fn managed_kind(slug: &str) -> ApiResult<EntityKind> {
    EntityKind::from_slug(slug)
        .filter(|kind| !kind.schema().singleton)
        .ok_or_else(|| ApiError::NotFound(format!("unknown collection: {slug}")))
}

/// Toast channel for one request, subscribed before any work starts.
struct Toasts {
    bus: ToastBus,
    rx: broadcast::Receiver<Toast>,
}

impl Toasts {
    fn new(state: &AppState) -> Self {
        let bus = state.toast_bus();
        let rx = bus.subscribe();
        Self { bus, rx }
    }

    fn take(&mut self) -> Vec<Toast> {
        drain(&mut self.rx)
    }

    /// Toast the store failure and turn it into the error response.
    fn failed(&mut self, table: &str, err: StoreError) -> ApiError {
        tracing::warn!(table, error = %err, "fetch failed");
        self.bus.notify(Level::Error, err.to_string());
        ApiError::submit(SubmitError::Store(err), self.take(), None)
    }
}

/// The row being edited. Missing rows are a 404; other store failures keep
/// their message and status.
async fn load_row(
    state: &AppState,
    kind: EntityKind,
    id: &str,
    toasts: &mut Toasts,
    lang: Language,
) -> ApiResult<Row> {
    match state.store().get_one(kind.table(), id).await.optional() {
        Ok(Some(row)) => Ok(row),
        Ok(None) => Err(ApiError::NotFound(messages::not_found(kind, lang))),
        Err(err) => Err(toasts.failed(kind.table(), err)),
    }
}

#[derive(Debug, Serialize)]
struct FieldView {
    name: &'static str,
    kind: &'static str,
    required: bool,
    columns: Vec<String>,
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Localized { .. } => "localized",
        FieldKind::LocalizedList => "localized_list",
        FieldKind::Text { .. } => "text",
        FieldKind::Url => "url",
        FieldKind::Email => "email",
        FieldKind::Integer { .. } => "integer",
        FieldKind::Bool => "bool",
        FieldKind::Icon => "icon",
    }
}

fn field_views(schema: &Schema) -> Vec<FieldView> {
    schema
        .fields
        .iter()
        .map(|field| FieldView {
            name: field.name,
            kind: kind_name(field.kind),
            required: field.required,
            columns: if field.is_localized() {
                Language::ALL.iter().map(|lang| lang.column(field.name)).collect()
            } else {
                vec![field.name.to_string()]
            },
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct Management {
    slug: &'static str,
    label: &'static str,
    table: TableView,
    items: Vec<Row>,
    next_order_index: Option<i64>,
    single_active: bool,
}

#[derive(Debug, Serialize)]
struct FormState {
    slug: &'static str,
    label: &'static str,
    form: FormMode,
    values: Row,
    errors: FieldErrors,
    fields: Vec<FieldView>,
    warnings: Vec<PreviewWarning>,
}

impl FormState {
    fn of(form: &FormController) -> Self {
        let schema = form.kind().schema();
        let warnings = match form.mode() {
            FormMode::Edit(row) => media::preview_warnings(schema, row),
            _ => Vec::new(),
        };
        Self {
            slug: schema.slug,
            label: schema.label,
            form: form.mode().clone(),
            values: form.values().clone(),
            errors: form.errors().clone(),
            fields: field_views(schema),
            warnings,
        }
    }
}

#[derive(Debug, Serialize)]
struct Saved {
    row: Row,
    warnings: Vec<PreviewWarning>,
    table: TableView,
}

#[derive(Debug, Serialize)]
struct Refreshed {
    table: TableView,
}

async fn dashboard(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    lang: Lang,
) -> Json<Page<Map<String, serde_json::Value>>> {
    let mut toasts = Toasts::new(&state);
    let mut counts = Map::new();
    for kind in EntityKind::ALL {
        let rows = fetch_rows(&state, kind, &ListQuery::new(), &toasts.bus).await;
        counts.insert(kind.slug().to_string(), rows.len().into());
    }
    let mut data = Map::new();
    data.insert("admin".into(), admin.email.into());
    data.insert("counts".into(), counts.into());
    Json(Page::new(lang.0, data, toasts.take()))
}

#[derive(Debug, Serialize)]
struct Content {
    hero: TableView,
    banners: TableView,
    farm_info: TableView,
}

async fn content(State(state): State<AppState>, lang: Lang) -> Json<Page<Content>> {
    let mut toasts = Toasts::new(&state);
    let table = |kind: EntityKind, rows: Vec<Row>| view::admin_table(kind, &rows, lang.0);
    let hero = fetch_rows(
        &state,
        EntityKind::HeroSlide,
        &ListQuery::for_schema(EntityKind::HeroSlide.schema()),
        &toasts.bus,
    )
    .await;
    let banners = fetch_rows(
        &state,
        EntityKind::Banner,
        &ListQuery::for_schema(EntityKind::Banner.schema()),
        &toasts.bus,
    )
    .await;
    let farm_info = fetch_rows(
        &state,
        EntityKind::FarmInfo,
        &ListQuery::for_schema(EntityKind::FarmInfo.schema()),
        &toasts.bus,
    )
    .await;
    let content = Content {
        hero: table(EntityKind::HeroSlide, hero),
        banners: table(EntityKind::Banner, banners),
        farm_info: table(EntityKind::FarmInfo, farm_info),
    };
    Json(Page::new(lang.0, content, toasts.take()))
}

async fn list(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    lang: Lang,
) -> ApiResult<Json<Page<Management>>> {
    let kind = managed_kind(&slug)?;
    let mut toasts = Toasts::new(&state);
    let mut form = state.form(kind, &toasts.bus);
    form.refresh().await;

    let schema = kind.schema();
    let management = Management {
        slug: schema.slug,
        label: schema.label,
        table: view::admin_table(kind, form.items(), lang.0),
        next_order_index: form.next_order_index(),
        single_active: schema.single_active.is_some(),
        items: form.into_items(),
    };
    Ok(Json(Page::new(lang.0, management, toasts.take())))
}

async fn new_form(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    lang: Lang,
) -> ApiResult<Json<Page<FormState>>> {
    let kind = managed_kind(&slug)?;
    let mut toasts = Toasts::new(&state);
    let mut form = state.form(kind, &toasts.bus);
    form.refresh().await;
    form.open_add();
    Ok(Json(Page::new(lang.0, FormState::of(&form), toasts.take())))
}

async fn edit_form(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    lang: Lang,
) -> ApiResult<Json<Page<FormState>>> {
    let kind = managed_kind(&slug)?;
    let mut toasts = Toasts::new(&state);
    let row = load_row(&state, kind, &id, &mut toasts, lang.0).await?;
    let mut form = state.form(kind, &toasts.bus);
    form.open_edit(row);
    Ok(Json(Page::new(lang.0, FormState::of(&form), toasts.take())))
}

/// Submit `payload` through an already-opened form.
async fn submit(
    mut form: FormController,
    mut toasts: Toasts,
    payload: FormPayload,
    lang: Language,
) -> ApiResult<Page<Saved>> {
    match form.submit(payload.values, payload.image).await {
        Ok(outcome) => {
            let saved = Saved {
                row: outcome.row,
                warnings: outcome.warnings,
                table: view::admin_table(form.kind(), form.items(), lang),
            };
            Ok(Page::new(lang, saved, toasts.take()))
        }
        Err(err) => Err(ApiError::submit(
            err,
            toasts.take(),
            Some(form.values().clone()),
        )),
    }
}

async fn create(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    lang: Lang,
    payload: FormPayload,
) -> ApiResult<(StatusCode, Json<Page<Saved>>)> {
    let kind = managed_kind(&slug)?;
    let toasts = Toasts::new(&state);
    let mut form = state.form(kind, &toasts.bus);
    form.refresh().await;
    form.open_add();
    let page = submit(form, toasts, payload, lang.0).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

async fn update(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    lang: Lang,
    payload: FormPayload,
) -> ApiResult<Json<Page<Saved>>> {
    let kind = managed_kind(&slug)?;
    let mut toasts = Toasts::new(&state);
    let row = load_row(&state, kind, &id, &mut toasts, lang.0).await?;
    let mut form = state.form(kind, &toasts.bus);
    form.open_edit(row);
    Ok(Json(submit(form, toasts, payload, lang.0).await?))
}

async fn remove(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    Query(confirm): Query<ConfirmQuery>,
    lang: Lang,
) -> ApiResult<Json<Page<Refreshed>>> {
    let kind = managed_kind(&slug)?;
    let mut toasts = Toasts::new(&state);
    let mut form = state.form(kind, &toasts.bus);
    form.refresh().await;

    let confirmed = |_prompt: &str| confirm.confirm;
    match form.delete(&id, &confirmed).await {
        Ok(()) => {
            let table = view::admin_table(kind, form.items(), lang.0);
            Ok(Json(Page::new(lang.0, Refreshed { table }, toasts.take())))
        }
        Err(err) => Err(ApiError::submit(err, toasts.take(), None)),
    }
}

async fn activate(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    lang: Lang,
) -> ApiResult<Json<Page<Refreshed>>> {
    let kind = managed_kind(&slug)?;
    let mut toasts = Toasts::new(&state);
    let mut form = state.form(kind, &toasts.bus);
    match form.activate(&id).await {
        Ok(()) => {
            let table = view::admin_table(kind, form.items(), lang.0);
            Ok(Json(Page::new(lang.0, Refreshed { table }, toasts.take())))
        }
        Err(err) => Err(ApiError::submit(err, toasts.take(), None)),
    }
}

async fn deactivate(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    lang: Lang,
) -> ApiResult<Json<Page<Refreshed>>> {
    let kind = managed_kind(&slug)?;
    let mut toasts = Toasts::new(&state);
    let mut form = state.form(kind, &toasts.bus);
    match form.deactivate(&id).await {
        Ok(()) => {
            let table = view::admin_table(kind, form.items(), lang.0);
            Ok(Json(Page::new(lang.0, Refreshed { table }, toasts.take())))
        }
        Err(err) => Err(ApiError::submit(err, toasts.take(), None)),
    }
}

/// Form over the settings row: edit when one exists, add only when the
/// table is known to be empty.
async fn settings_form(state: &AppState, toasts: &mut Toasts) -> ApiResult<FormController> {
    let row = match find_settings(state).await {
        Ok(row) => row,
        Err(err) => return Err(toasts.failed(EntityKind::SiteSettings.table(), err)),
    };
    let mut form = state.form(EntityKind::SiteSettings, &toasts.bus);
    match row {
        Some(row) => form.open_edit(row),
        None => form.open_add(),
    }
    Ok(form)
}

async fn settings(State(state): State<AppState>, lang: Lang) -> ApiResult<Json<Page<FormState>>> {
    let mut toasts = Toasts::new(&state);
    let form = settings_form(&state, &mut toasts).await?;
    Ok(Json(Page::new(lang.0, FormState::of(&form), toasts.take())))
}

async fn save_settings(
    State(state): State<AppState>,
    lang: Lang,
    payload: FormPayload,
) -> ApiResult<Json<Page<Saved>>> {
    let mut toasts = Toasts::new(&state);
    let form = settings_form(&state, &mut toasts).await?;
    Ok(Json(submit(form, toasts, payload, lang.0).await?))
}
