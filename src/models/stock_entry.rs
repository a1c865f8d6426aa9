//! Stock intake audit records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Append-only audit record of a replenishment event. Each row corresponds
/// to exactly one ledger increment of the same magnitude; rows are never
/// updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StockEntry {
    pub id: Uuid,
    pub item_id: Uuid,
    pub quantity_added: i32,
    pub date_added: DateTime<Utc>,
}

/// Stock intake request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddStock {
    pub item_id: Uuid,
    pub quantity: i32,
}
