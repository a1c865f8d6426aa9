//! Loan (borrow) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Loan record. A loan with `return_date = NULL` represents one copy of the
/// item currently checked out; exactly one ledger decrement was paired with
/// its creation and exactly one increment is paired with its return.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: Uuid,
    pub item_id: Uuid,
    pub member_id: Uuid,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }
}

/// Issue loan request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IssueLoan {
    pub item_id: Uuid,
    pub member_id: Uuid,
    pub due_date: DateTime<Utc>,
}

/// Outcome of a return: distinguishes a fresh return from an idempotent
/// replay, so callers can tell whether this call moved the ledger.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnOutcome {
    pub loan: Loan,
    /// False when the loan had already been returned and this call changed nothing
    pub returned_now: bool,
}
