//! Catalog item endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        item::{CreateItem, Item, UpdateItem},
        stock_entry::StockEntry,
        user::Role,
    },
};

use super::CurrentUser;

/// List all catalog items
#[utoipa::path(
    get,
    path = "/items",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All items", body = Vec<Item>)
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Item>>> {
    user.role.require(Role::Member)?;

    let items = state.services.catalog.list_items().await?;
    Ok(Json(items))
}

/// Get an item by ID
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item", body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Item>> {
    user.role.require(Role::Member)?;

    let item = state.services.catalog.get_item(id).await?;
    Ok(Json(item))
}

/// Create a catalog item
#[utoipa::path(
    post,
    path = "/items",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<Item>)> {
    user.role.require(Role::Librarian)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let item = state.services.catalog.create_item(request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update an item's descriptive fields. The copy count is not updatable
/// here; it moves only through circulation and stock intake.
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateItem>,
) -> AppResult<Json<Item>> {
    user.role.require(Role::Librarian)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let item = state.services.catalog.update_item(id, request).await?;
    Ok(Json(item))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete_item(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.role.require(Role::Librarian)?;

    state.services.catalog.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Intake history for an item
#[utoipa::path(
    get,
    path = "/items/{id}/stock-entries",
    tag = "stock",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Stock intake history", body = Vec<StockEntry>),
        (status = 404, description = "Item not found")
    )
)]
pub async fn item_stock_history(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<StockEntry>>> {
    user.role.require(Role::Librarian)?;

    let entries = state.services.catalog.item_stock_history(id).await?;
    Ok(Json(entries))
}
