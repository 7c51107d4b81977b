use serde::Serialize;
use sqlx::FromRow;

/// Flat menu row as stored. A `parent_id` of `None` marks a root; the nested
/// shape returned by the API is derived per request and never persisted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MenuRecord {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub display_order: i32,
}
