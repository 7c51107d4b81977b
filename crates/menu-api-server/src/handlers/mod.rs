pub mod health;
pub mod menu;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::services::MenuService;

pub fn build_router(menu_service: Arc<MenuService>) -> Router {
    Router::new()
        .route("/", get(menu::menu_tree_handler))
        .route("/health", get(health::health_check))
        .layer(Extension(menu_service))
        // CORS
        .layer(CorsLayer::permissive())
        // Tracing
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
