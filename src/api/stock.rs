//! Stock intake endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        stock_entry::{AddStock, StockEntry},
        user::Role,
    },
};

use super::CurrentUser;

/// Record a stock intake: credits the item's available quantity and appends
/// an audit entry of the same magnitude.
#[utoipa::path(
    post,
    path = "/stock-entries",
    tag = "stock",
    security(("bearer_auth" = [])),
    request_body = AddStock,
    responses(
        (status = 201, description = "Stock recorded", body = StockEntry),
        (status = 400, description = "Quantity must be positive"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn add_stock(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<AddStock>,
) -> AppResult<(StatusCode, Json<StockEntry>)> {
    user.role.require(Role::Librarian)?;

    let entry = state.services.circulation.add_stock(request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
