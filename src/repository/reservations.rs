//! Reservations repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::reservation::{CreateReservation, Reservation, ReservationStatus},
};

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
    }

    /// List all reservations
    pub async fn list(&self) -> AppResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations ORDER BY reservation_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(reservations)
    }

    /// Create a reservation in the pending state
    pub async fn create(
        &self,
        reservation: &CreateReservation,
        reservation_date: DateTime<Utc>,
    ) -> AppResult<Reservation> {
        let created = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (item_id, member_id, reservation_date, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(reservation.item_id)
        .bind(reservation.member_id)
        .bind(reservation_date)
        .bind(ReservationStatus::Pending)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Move a reservation from `from` to `to`. Returns false when the row is
    /// no longer in `from` (lost to a concurrent transition) without writing.
    ///
    /// Keying the UPDATE on the expected current status enforces the monotone
    /// lifecycle under concurrency: of two racing transitions out of pending,
    /// exactly one observes an affected row.
    pub async fn transition_status(
        &self,
        id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query("UPDATE reservations SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(from)
            .bind(to)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
