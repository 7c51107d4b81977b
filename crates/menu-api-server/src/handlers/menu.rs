use crate::services::{MenuNode, MenuService};
use crate::utils::error::ApiError;
use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::info;

/// GET / — the whole menu hierarchy, roots first, children nested.
pub async fn menu_tree_handler(
    Extension(menu_service): Extension<Arc<MenuService>>,
) -> Result<Json<Vec<MenuNode>>, ApiError> {
    info!("Menu tree request");

    let tree = menu_service.menu_tree().await?;

    Ok(Json(tree))
}
