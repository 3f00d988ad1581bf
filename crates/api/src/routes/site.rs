//! Public site pages, rendered as view models in the visitor's language.
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use dairy_cms_core::active;
use dairy_cms_core::notify::{drain, Level, Notifier, ToastBus};
use dairy_cms_core::schema::EntityKind;
use dairy_cms_core::store::{row_id, Filter, ListQuery};
use dairy_cms_core::view::{self, Card, DetailPage, DetailView, ListView};
use dairy_cms_core::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{fetch_row, fetch_rows, fetch_settings, Page};
use crate::extract::Lang;
use crate::state::AppState;

/// Remembers which discount's flyer the visitor closed.
pub const FLYER_COOKIE: &str = "flyer_dismissed";

const FEATURED_LIMIT: usize = 6;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/site/home", get(home))
        .route("/v1/site/products", get(products))
        .route("/v1/site/products/{id}", get(product))
        .route("/v1/site/distributors", get(distributors))
        .route("/v1/site/recipes", get(recipes))
        .route("/v1/site/recipes/{id}", get(recipe))
        .route("/v1/site/blog", get(blog))
        .route("/v1/site/blog/{id}", get(blog_post))
        .route("/v1/site/about", get(about))
        .route("/v1/site/contact", get(contact))
        .route("/v1/site/discount", get(discount))
        .route("/v1/site/discount/{id}/dismiss", post(dismiss_flyer))
}

async fn visible_cards(state: &AppState, kind: EntityKind, lang: Lang, bus: &ToastBus) -> ListView {
    let rows = fetch_rows(state, kind, &ListQuery::visible(kind.schema()), bus).await;
    view::card_list(kind, &rows, lang.0)
}

/// The active row of a single-active table; lookup failures become toasts.
async fn active_row(state: &AppState, kind: EntityKind, bus: &ToastBus) -> Option<Row> {
    match active::active_row(state.store(), kind).await {
        Ok(row) => row,
        Err(err) => {
            tracing::warn!(table = kind.table(), error = %err, "active row lookup failed");
            bus.notify(Level::Error, err.to_string());
            None
        }
    }
}

fn is_public(kind: EntityKind, row: &Row) -> bool {
    match kind.schema().visibility {
        Some(flag) => row.get(flag).and_then(Value::as_bool).unwrap_or(false),
        None => true,
    }
}

async fn detail_response(state: &AppState, kind: EntityKind, id: &str, lang: Lang) -> Response {
    let bus = state.toast_bus();
    let mut rx = bus.subscribe();
    let row = fetch_row(state, kind, id, &bus)
        .await
        .filter(|row| is_public(kind, row));
    let page = view::detail_page(kind, row.as_ref(), lang.0);
    let status = match page {
        DetailPage::Found(_) => StatusCode::OK,
        DetailPage::NotFound { .. } => StatusCode::NOT_FOUND,
    };
    (status, Json(Page::new(lang.0, page, drain(&mut rx)))).into_response()
}

#[derive(Debug, Serialize)]
struct Home {
    settings: Option<DetailView>,
    hero: ListView,
    banner: Option<Card>,
    featured: ListView,
    facts: ListView,
    farm_info: ListView,
}

async fn home(State(state): State<AppState>, lang: Lang) -> Json<Page<Home>> {
    let bus = state.toast_bus();
    let mut rx = bus.subscribe();

    let settings = fetch_settings(&state, &bus)
        .await
        .map(|row| view::detail(EntityKind::SiteSettings, &row, lang.0));
    let banner = active_row(&state, EntityKind::Banner, &bus)
        .await
        .map(|row| view::card(EntityKind::Banner, &row, lang.0));
    let featured_query = ListQuery::for_schema(EntityKind::Product.schema())
        .filter(Filter::eq("is_featured", true))
        .limit(FEATURED_LIMIT);
    let featured = fetch_rows(&state, EntityKind::Product, &featured_query, &bus).await;

    let home = Home {
        settings,
        hero: visible_cards(&state, EntityKind::HeroSlide, lang, &bus).await,
        banner,
        featured: view::card_list(EntityKind::Product, &featured, lang.0),
        facts: visible_cards(&state, EntityKind::Fact, lang, &bus).await,
        farm_info: visible_cards(&state, EntityKind::FarmInfo, lang, &bus).await,
    };
    Json(Page::new(lang.0, home, drain(&mut rx)))
}

#[derive(Debug, Deserialize)]
struct ProductFilter {
    category: Option<String>,
}

#[derive(Debug, Serialize)]
struct Listing {
    items: ListView,
}

async fn products(
    State(state): State<AppState>,
    lang: Lang,
    Query(filter): Query<ProductFilter>,
) -> Json<Page<Listing>> {
    let bus = state.toast_bus();
    let mut rx = bus.subscribe();
    let mut query = ListQuery::visible(EntityKind::Product.schema());
    if let Some(category) = filter.category.filter(|c| !c.trim().is_empty()) {
        query = query.filter(Filter::eq("category", category));
    }
    let rows = fetch_rows(&state, EntityKind::Product, &query, &bus).await;
    let items = view::card_list(EntityKind::Product, &rows, lang.0);
    Json(Page::new(lang.0, Listing { items }, drain(&mut rx)))
}

async fn listing(state: &AppState, kind: EntityKind, lang: Lang) -> Json<Page<Listing>> {
    let bus = state.toast_bus();
    let mut rx = bus.subscribe();
    let items = visible_cards(state, kind, lang, &bus).await;
    Json(Page::new(lang.0, Listing { items }, drain(&mut rx)))
}

async fn product(State(state): State<AppState>, lang: Lang, Path(id): Path<String>) -> Response {
    detail_response(&state, EntityKind::Product, &id, lang).await
}

async fn distributors(State(state): State<AppState>, lang: Lang) -> Json<Page<Listing>> {
    listing(&state, EntityKind::Distributor, lang).await
}

async fn recipes(State(state): State<AppState>, lang: Lang) -> Json<Page<Listing>> {
    listing(&state, EntityKind::Recipe, lang).await
}

async fn recipe(State(state): State<AppState>, lang: Lang, Path(id): Path<String>) -> Response {
    detail_response(&state, EntityKind::Recipe, &id, lang).await
}

async fn blog(State(state): State<AppState>, lang: Lang) -> Json<Page<Listing>> {
    listing(&state, EntityKind::BlogPost, lang).await
}

async fn blog_post(State(state): State<AppState>, lang: Lang, Path(id): Path<String>) -> Response {
    detail_response(&state, EntityKind::BlogPost, &id, lang).await
}

#[derive(Debug, Serialize)]
struct About {
    farm_info: ListView,
    facts: ListView,
}

async fn about(State(state): State<AppState>, lang: Lang) -> Json<Page<About>> {
    let bus = state.toast_bus();
    let mut rx = bus.subscribe();
    let about = About {
        farm_info: visible_cards(&state, EntityKind::FarmInfo, lang, &bus).await,
        facts: visible_cards(&state, EntityKind::Fact, lang, &bus).await,
    };
    Json(Page::new(lang.0, about, drain(&mut rx)))
}

#[derive(Debug, Serialize)]
struct Contact {
    settings: Option<DetailView>,
    faq: ListView,
}

async fn contact(State(state): State<AppState>, lang: Lang) -> Json<Page<Contact>> {
    let bus = state.toast_bus();
    let mut rx = bus.subscribe();
    let settings = fetch_settings(&state, &bus)
        .await
        .map(|row| view::detail(EntityKind::SiteSettings, &row, lang.0));
    let contact = Contact {
        settings,
        faq: visible_cards(&state, EntityKind::FaqItem, lang, &bus).await,
    };
    Json(Page::new(lang.0, contact, drain(&mut rx)))
}

#[derive(Debug, Serialize)]
struct Discount {
    discount: Option<DetailView>,
    show_flyer: bool,
}

async fn discount(
    State(state): State<AppState>,
    lang: Lang,
    jar: CookieJar,
) -> Json<Page<Discount>> {
    let bus = state.toast_bus();
    let mut rx = bus.subscribe();
    let row = active_row(&state, EntityKind::Discount, &bus).await;
    let dismissed = jar.get(FLYER_COOKIE).map(|cookie| cookie.value().to_string());
    let show_flyer = match row.as_ref().and_then(row_id) {
        Some(id) => dismissed.as_deref() != Some(id.as_str()),
        None => false,
    };
    let discount = Discount {
        discount: row.map(|row| view::detail(EntityKind::Discount, &row, lang.0)),
        show_flyer,
    };
    Json(Page::new(lang.0, discount, drain(&mut rx)))
}

/// Hide the flyer for discount `id`; a different active discount shows again.
/// The flag outlives the browser session.
async fn dismiss_flyer(Path(id): Path<String>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let cookie = Cookie::build((FLYER_COOKIE, id)).path("/").permanent().build();
    (jar.add(cookie), StatusCode::NO_CONTENT)
}
