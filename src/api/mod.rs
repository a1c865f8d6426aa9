//! API handlers for Libris REST endpoints

pub mod auth;
pub mod authors;
pub mod health;
pub mod items;
pub mod loans;
pub mod members;
pub mod openapi;
pub mod reservations;
pub mod stock;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, services::auth::AuthenticatedUser, AppState};

/// Extractor for the authenticated caller.
///
/// Pulls the bearer token from the Authorization header, verifies it and
/// re-resolves the caller's role from the users store, so handlers always
/// gate on the current role rather than the one embedded at issue time.
pub struct CurrentUser(pub AuthenticatedUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        // Check for Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication(
                "Invalid authorization header format".to_string(),
            ));
        }

        let token = &auth_header[7..];

        let user = state.services.gate.verify(token).await?;
        Ok(CurrentUser(user))
    }
}
