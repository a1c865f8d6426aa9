//! Reservation endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        loan::Loan,
        reservation::{CreateReservation, Reservation},
        user::Role,
    },
};

use super::CurrentUser;

/// Fulfillment request: due date for the loan the reservation becomes
#[derive(Deserialize, ToSchema)]
pub struct FulfillRequest {
    pub due_date: DateTime<Utc>,
}

/// Fulfillment response
#[derive(Serialize, ToSchema)]
pub struct FulfillResponse {
    pub reservation: Reservation,
    pub loan: Loan,
}

/// List all reservations
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All reservations", body = Vec<Reservation>)
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Reservation>>> {
    user.role.require(Role::Librarian)?;

    let reservations = state.services.circulation.list_reservations().await?;
    Ok(Json(reservations))
}

/// Get a reservation by ID
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation", body = Reservation),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Reservation>> {
    user.role.require(Role::Member)?;

    let reservation = state.services.circulation.get_reservation(id).await?;
    Ok(Json(reservation))
}

/// Place a reservation. This is a claim on the item, not a stock hold:
/// available quantity is unaffected until the reservation is fulfilled.
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created", body = Reservation),
        (status = 404, description = "Item or member not found")
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    user.role.require(Role::Member)?;

    let reservation = state.services.circulation.reserve(request).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Cancel a pending reservation
#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation cancelled", body = Reservation),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation is not pending")
    )
)]
pub async fn cancel_reservation(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Reservation>> {
    user.role.require(Role::Member)?;

    let reservation = state.services.circulation.cancel_reservation(id).await?;
    Ok(Json(reservation))
}

/// Fulfill a pending reservation by converting it into a loan
#[utoipa::path(
    post,
    path = "/reservations/{id}/fulfill",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Reservation ID")
    ),
    request_body = FulfillRequest,
    responses(
        (status = 200, description = "Reservation fulfilled", body = FulfillResponse),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation is not pending or no copies available")
    )
)]
pub async fn fulfill_reservation(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<FulfillRequest>,
) -> AppResult<Json<FulfillResponse>> {
    user.role.require(Role::Librarian)?;

    let (loan, reservation) = state
        .services
        .circulation
        .fulfill_reservation(id, request.due_date)
        .await?;
    Ok(Json(FulfillResponse { reservation, loan }))
}
