//! Reservation model and status lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Reservation lifecycle status.
///
/// `Pending` is the only non-terminal state: it may move to `Fulfilled`
/// (converted into a loan) or `Cancelled`. Nothing leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Fulfilled,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Fulfilled => "fulfilled",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationStatus::Fulfilled | ReservationStatus::Cancelled)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        matches!(
            (self, next),
            (ReservationStatus::Pending, ReservationStatus::Fulfilled)
                | (ReservationStatus::Pending, ReservationStatus::Cancelled)
        )
    }

    /// Validate a transition, returning the typed error on misuse.
    pub fn transition_to(&self, next: ReservationStatus) -> AppResult<ReservationStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::InvalidStateTransition(format!(
                "Reservation cannot move from {} to {}",
                self.as_str(),
                next.as_str()
            )))
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReservationStatus::Pending),
            "fulfilled" => Ok(ReservationStatus::Fulfilled),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            _ => Err(format!("Invalid reservation status: {}", s)),
        }
    }
}

// SQLx conversion for ReservationStatus (stored as text)
impl sqlx::Type<Postgres> for ReservationStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for ReservationStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for ReservationStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Reservation record: a member's claim on an item.
///
/// A reservation is not a stock hold; the ledger is only touched when a
/// pending reservation is fulfilled into a loan.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: Uuid,
    pub item_id: Uuid,
    pub member_id: Uuid,
    pub reservation_date: DateTime<Utc>,
    pub status: ReservationStatus,
}

/// Create reservation request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReservation {
    pub item_id: Uuid,
    pub member_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_reaches_both_terminal_states() {
        assert!(ReservationStatus::Pending.can_transition_to(ReservationStatus::Fulfilled));
        assert!(ReservationStatus::Pending.can_transition_to(ReservationStatus::Cancelled));
    }

    #[test]
    fn terminal_states_admit_no_transition() {
        for from in [ReservationStatus::Fulfilled, ReservationStatus::Cancelled] {
            for to in [
                ReservationStatus::Pending,
                ReservationStatus::Fulfilled,
                ReservationStatus::Cancelled,
            ] {
                assert!(!from.can_transition_to(to), "{} -> {} should be illegal", from, to);
                assert!(matches!(
                    from.transition_to(to),
                    Err(AppError::InvalidStateTransition(_))
                ));
            }
        }
    }

    #[test]
    fn pending_cannot_loop_to_pending() {
        assert!(ReservationStatus::Pending
            .transition_to(ReservationStatus::Pending)
            .is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Fulfilled,
            ReservationStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<ReservationStatus>().unwrap(), status);
        }
    }
}
