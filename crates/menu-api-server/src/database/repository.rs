use super::{DbPool, MenuRecord};
use anyhow::Result;
use tracing::debug;

use crate::services::MenuStore;

pub struct Repository {
    pub pool: DbPool,
}

impl Repository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Read every menu row in a single pass. Sibling ordering is applied
    /// during tree assembly, not here.
    pub async fn get_menu_records(&self) -> Result<Vec<MenuRecord>> {
        let records = sqlx::query_as::<_, MenuRecord>(
            r#"SELECT
                id,
                name,
                parent_id,
                display_order
               FROM menu"#,
        )
        .fetch_all(self.pool.get_pool())
        .await?;

        debug!("Fetched {} menu rows", records.len());

        Ok(records)
    }
}

#[async_trait::async_trait]
impl MenuStore for Repository {
    async fn fetch_all(&self) -> Result<Vec<MenuRecord>> {
        self.get_menu_records().await
    }
}
