//! Circulation engine: loans, returns, stock intake and reservations.
//!
//! Every operation pairs one ledger adjustment with one record write. The
//! store offers no cross-record transaction, so effective atomicity comes
//! from ordering (ledger first) plus a compensating reversal when the record
//! step fails. A compensation that cannot be applied after bounded retries
//! escalates to [`AppError::ConsistencyAlarm`] instead of leaving the ledger
//! silently diverged.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::{
        loan::{IssueLoan, Loan, ReturnOutcome},
        reservation::{CreateReservation, Reservation, ReservationStatus},
        stock_entry::{AddStock, StockEntry},
    },
    repository::Repository,
};

/// Persistence operations the circulation engine needs.
///
/// The engine takes this as an explicit handle at construction; the
/// production implementation is [`Repository`], tests drive the engine with
/// an in-memory store.
#[async_trait]
pub trait CirculationStore: Send + Sync {
    async fn item_exists(&self, item_id: Uuid) -> AppResult<bool>;
    async fn member_exists(&self, member_id: Uuid) -> AppResult<bool>;

    /// Atomic quantity adjustment; the ledger's only write path.
    async fn adjust_quantity(&self, item_id: Uuid, delta: i32) -> AppResult<i32>;

    async fn create_loan(&self, loan: &IssueLoan, issue_date: DateTime<Utc>) -> AppResult<Loan>;
    async fn get_loan(&self, id: Uuid) -> AppResult<Loan>;
    /// Guarded mark; false means the loan was already returned.
    async fn mark_loan_returned(&self, id: Uuid, returned_at: DateTime<Utc>) -> AppResult<bool>;

    async fn create_stock_entry(
        &self,
        item_id: Uuid,
        quantity_added: i32,
        date_added: DateTime<Utc>,
    ) -> AppResult<StockEntry>;

    async fn create_reservation(
        &self,
        reservation: &CreateReservation,
        reservation_date: DateTime<Utc>,
    ) -> AppResult<Reservation>;
    async fn get_reservation(&self, id: Uuid) -> AppResult<Reservation>;
    /// Guarded transition; false means the row left `from` concurrently.
    async fn transition_reservation(
        &self,
        id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> AppResult<bool>;
}

#[async_trait]
impl CirculationStore for Repository {
    async fn item_exists(&self, item_id: Uuid) -> AppResult<bool> {
        self.items.exists(item_id).await
    }

    async fn member_exists(&self, member_id: Uuid) -> AppResult<bool> {
        self.members.exists(member_id).await
    }

    async fn adjust_quantity(&self, item_id: Uuid, delta: i32) -> AppResult<i32> {
        self.items.adjust_quantity(item_id, delta).await
    }

    async fn create_loan(&self, loan: &IssueLoan, issue_date: DateTime<Utc>) -> AppResult<Loan> {
        self.loans.create(loan, issue_date).await
    }

    async fn get_loan(&self, id: Uuid) -> AppResult<Loan> {
        self.loans.get_by_id(id).await
    }

    async fn mark_loan_returned(&self, id: Uuid, returned_at: DateTime<Utc>) -> AppResult<bool> {
        self.loans.mark_returned(id, returned_at).await
    }

    async fn create_stock_entry(
        &self,
        item_id: Uuid,
        quantity_added: i32,
        date_added: DateTime<Utc>,
    ) -> AppResult<StockEntry> {
        self.stock_entries.create(item_id, quantity_added, date_added).await
    }

    async fn create_reservation(
        &self,
        reservation: &CreateReservation,
        reservation_date: DateTime<Utc>,
    ) -> AppResult<Reservation> {
        self.reservations.create(reservation, reservation_date).await
    }

    async fn get_reservation(&self, id: Uuid) -> AppResult<Reservation> {
        self.reservations.get_by_id(id).await
    }

    async fn transition_reservation(
        &self,
        id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> AppResult<bool> {
        self.reservations.transition_status(id, from, to).await
    }
}

#[derive(Clone)]
pub struct CirculationService<S> {
    store: S,
    config: CirculationConfig,
}

impl<S: CirculationStore> CirculationService<S> {
    pub fn new(store: S, config: CirculationConfig) -> Self {
        Self { store, config }
    }

    /// Issue a loan: ledger decrement paired with one open loan record.
    pub async fn issue_loan(&self, request: IssueLoan) -> AppResult<Loan> {
        let now = Utc::now();

        if self.config.enforce_future_due_date && request.due_date <= now {
            return Err(AppError::Validation(
                "Due date must be in the future".to_string(),
            ));
        }

        // Member is checked up front; item existence is checked by the
        // ledger itself, so a missing item never needs compensation.
        if !self.store.member_exists(request.member_id).await? {
            return Err(AppError::NotFound(format!(
                "Member {} not found",
                request.member_id
            )));
        }

        self.store.adjust_quantity(request.item_id, -1).await?;

        match self.store.create_loan(&request, now).await {
            Ok(loan) => {
                tracing::info!(
                    loan_id = %loan.id,
                    item_id = %request.item_id,
                    member_id = %request.member_id,
                    "loan issued"
                );
                Ok(loan)
            }
            Err(err) => {
                // The decrement is already durable; reverse it before
                // reporting, or escalate if the reversal cannot land.
                self.apply_with_retry(request.item_id, 1, "issue-loan compensation")
                    .await?;
                Err(err)
            }
        }
    }

    /// Receive a returned copy. Marking the loan is the guarded first step,
    /// so a replayed return is a no-op success rather than a double
    /// increment.
    pub async fn return_loan(&self, loan_id: Uuid) -> AppResult<ReturnOutcome> {
        let now = Utc::now();
        let loan = self.store.get_loan(loan_id).await?;

        let marked_now = self.store.mark_loan_returned(loan_id, now).await?;
        if !marked_now {
            tracing::debug!(loan_id = %loan_id, "loan already returned, no-op");
            return Ok(ReturnOutcome {
                loan,
                returned_now: false,
            });
        }

        // One increment per mark. If the increment cannot be applied the
        // loan stays marked and the failure escalates; unmarking would
        // re-open the window for a second increment.
        self.apply_with_retry(loan.item_id, 1, "return-loan increment")
            .await?;

        let loan = self.store.get_loan(loan_id).await?;
        tracing::info!(loan_id = %loan_id, item_id = %loan.item_id, "loan returned");
        Ok(ReturnOutcome {
            loan,
            returned_now: true,
        })
    }

    /// Stock intake: ledger increment first, audit row second, so no audit
    /// row ever exists without its ledger effect.
    pub async fn add_stock(&self, request: AddStock) -> AppResult<StockEntry> {
        if request.quantity <= 0 {
            return Err(AppError::Validation(
                "Stock quantity must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        self.store
            .adjust_quantity(request.item_id, request.quantity)
            .await?;

        match self
            .store
            .create_stock_entry(request.item_id, request.quantity, now)
            .await
        {
            Ok(entry) => {
                tracing::info!(
                    item_id = %request.item_id,
                    quantity = request.quantity,
                    "stock added"
                );
                Ok(entry)
            }
            Err(err) => {
                self.apply_with_retry(
                    request.item_id,
                    -request.quantity,
                    "stock-intake compensation",
                )
                .await?;
                Err(err)
            }
        }
    }

    /// Create a pending reservation. A reservation is a claim, not a stock
    /// hold: the ledger is untouched until fulfillment.
    pub async fn reserve(&self, request: CreateReservation) -> AppResult<Reservation> {
        if !self.store.item_exists(request.item_id).await? {
            return Err(AppError::NotFound(format!(
                "Item {} not found",
                request.item_id
            )));
        }
        if !self.store.member_exists(request.member_id).await? {
            return Err(AppError::NotFound(format!(
                "Member {} not found",
                request.member_id
            )));
        }

        let reservation = self.store.create_reservation(&request, Utc::now()).await?;
        tracing::info!(reservation_id = %reservation.id, item_id = %request.item_id, "reservation created");
        Ok(reservation)
    }

    /// Cancel a pending reservation.
    pub async fn cancel_reservation(&self, reservation_id: Uuid) -> AppResult<Reservation> {
        let reservation = self.store.get_reservation(reservation_id).await?;
        reservation
            .status
            .transition_to(ReservationStatus::Cancelled)?;

        let transitioned = self
            .store
            .transition_reservation(
                reservation_id,
                ReservationStatus::Pending,
                ReservationStatus::Cancelled,
            )
            .await?;
        if !transitioned {
            // Lost the guard to a concurrent fulfillment or cancellation
            return Err(AppError::InvalidStateTransition(format!(
                "Reservation {} is no longer pending",
                reservation_id
            )));
        }

        tracing::info!(reservation_id = %reservation_id, "reservation cancelled");
        self.store.get_reservation(reservation_id).await
    }

    /// Convert a pending reservation into a loan. This is the only path to
    /// the `fulfilled` state, and the point where the claimed copy is
    /// actually taken from stock.
    pub async fn fulfill_reservation(
        &self,
        reservation_id: Uuid,
        due_date: DateTime<Utc>,
    ) -> AppResult<(Loan, Reservation)> {
        let reservation = self.store.get_reservation(reservation_id).await?;
        reservation
            .status
            .transition_to(ReservationStatus::Fulfilled)?;

        let loan = self
            .issue_loan(IssueLoan {
                item_id: reservation.item_id,
                member_id: reservation.member_id,
                due_date,
            })
            .await?;

        let transitioned = self
            .store
            .transition_reservation(
                reservation_id,
                ReservationStatus::Pending,
                ReservationStatus::Fulfilled,
            )
            .await?;
        if !transitioned {
            // A concurrent cancel won the guard; undo the loan we just issued.
            let marked = self.store.mark_loan_returned(loan.id, Utc::now()).await?;
            if marked {
                self.apply_with_retry(loan.item_id, 1, "reservation-fulfillment compensation")
                    .await?;
            }
            return Err(AppError::InvalidStateTransition(format!(
                "Reservation {} is no longer pending",
                reservation_id
            )));
        }

        let reservation = self.store.get_reservation(reservation_id).await?;
        tracing::info!(
            reservation_id = %reservation_id,
            loan_id = %loan.id,
            "reservation fulfilled"
        );
        Ok((loan, reservation))
    }

    /// Apply a ledger adjustment that must eventually land, retrying with
    /// backoff. Exhausting the retries means ledger and records have
    /// provably diverged: escalate, never swallow.
    async fn apply_with_retry(&self, item_id: Uuid, delta: i32, context: &str) -> AppResult<()> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.store.adjust_quantity(item_id, delta).await {
                Ok(_) => return Ok(()),
                Err(err) if attempt >= self.config.compensation_max_attempts => {
                    return Err(AppError::ConsistencyAlarm(format!(
                        "{}: ledger adjustment {} for item {} failed after {} attempts: {}",
                        context, delta, item_id, attempt, err
                    )));
                }
                Err(err) => {
                    tracing::warn!(
                        item_id = %item_id,
                        delta,
                        attempt,
                        error = %err,
                        "{} failed, retrying",
                        context
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.compensation_backoff_ms))
                        .await;
                }
            }
        }
    }
}

/// Read-side passthroughs for the production store.
impl CirculationService<Repository> {
    pub async fn list_loans(&self) -> AppResult<Vec<Loan>> {
        self.store.loans.list().await
    }

    pub async fn get_loan(&self, id: Uuid) -> AppResult<Loan> {
        self.store.loans.get_by_id(id).await
    }

    pub async fn list_reservations(&self) -> AppResult<Vec<Reservation>> {
        self.store.reservations.list().await
    }

    pub async fn get_reservation(&self, id: Uuid) -> AppResult<Reservation> {
        self.store.reservations.get_by_id(id).await
    }
}
