//! Stock entries repository: append-only intake audit

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{error::AppResult, models::stock_entry::StockEntry};

#[derive(Clone)]
pub struct StockEntriesRepository {
    pool: Pool<Postgres>,
}

impl StockEntriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append an intake record. There is no update or delete counterpart.
    pub async fn create(
        &self,
        item_id: Uuid,
        quantity_added: i32,
        date_added: DateTime<Utc>,
    ) -> AppResult<StockEntry> {
        let created = sqlx::query_as::<_, StockEntry>(
            r#"
            INSERT INTO stock_entries (item_id, quantity_added, date_added)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(quantity_added)
        .bind(date_added)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Intake history for an item
    pub async fn list_for_item(&self, item_id: Uuid) -> AppResult<Vec<StockEntry>> {
        let entries = sqlx::query_as::<_, StockEntry>(
            "SELECT * FROM stock_entries WHERE item_id = $1 ORDER BY date_added DESC",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
