//! Loan circulation endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        loan::{IssueLoan, Loan},
        user::Role,
    },
};

use super::CurrentUser;

/// Return response with the settled loan
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// "returned" for a fresh return, "already_returned" for a replay
    pub status: String,
    pub loan: Loan,
}

/// List all loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All loans", body = Vec<Loan>)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Loan>>> {
    user.role.require(Role::Librarian)?;

    let loans = state.services.circulation.list_loans().await?;
    Ok(Json(loans))
}

/// Get a loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Loan>> {
    user.role.require(Role::Librarian)?;

    let loan = state.services.circulation.get_loan(id).await?;
    Ok(Json(loan))
}

/// Issue a loan (check a copy out to a member)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = IssueLoan,
    responses(
        (status = 201, description = "Loan issued", body = Loan),
        (status = 404, description = "Item or member not found"),
        (status = 409, description = "No copies available")
    )
)]
pub async fn issue_loan(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<IssueLoan>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    user.role.require(Role::Librarian)?;

    let loan = state.services.circulation.issue_loan(request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Receive a returned copy. Safe to replay: a second return of the same
/// loan reports success without a second inventory credit.
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Copy received", body = ReturnResponse),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    CurrentUser(user): CurrentUser,
    Path(loan_id): Path<Uuid>,
) -> AppResult<Json<ReturnResponse>> {
    user.role.require(Role::Librarian)?;

    let outcome = state.services.circulation.return_loan(loan_id).await?;
    Ok(Json(ReturnResponse {
        status: if outcome.returned_now {
            "returned".to_string()
        } else {
            "already_returned".to_string()
        },
        loan: outcome.loan,
    }))
}
