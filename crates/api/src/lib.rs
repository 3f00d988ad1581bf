//! HTTP surface of the dairy site: public pages, admin sign-in and the
//! content management routes.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;

/// Router with every route group and the middleware stack applied.
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config().max_upload_bytes;
    routes::build_router(state)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::request_tracing::trace_layer())
                .layer(middleware::cors::cors_layer())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
}
