//! Item (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Catalog item with its tracked copy count.
///
/// `quantity` is the number of copies currently available to loan. It is
/// mutated only through the ledger's `adjust_quantity`; the catalog update
/// surface never writes it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub author_id: Option<Uuid>,
    pub genre: Option<String>,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// Create item request. New items start at quantity 0 and are
/// replenished through stock intake.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub author_id: Option<Uuid>,
    pub genre: Option<String>,
}

/// Update item request (descriptive fields only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub author_id: Option<Uuid>,
    pub genre: Option<String>,
}
