//! Loans repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::loan::{IssueLoan, Loan},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))
    }

    /// List all loans
    pub async fn list(&self) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>("SELECT * FROM loans ORDER BY issue_date DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// Get open loans for a member
    pub async fn get_member_loans(&self, member_id: Uuid) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE member_id = $1 AND return_date IS NULL ORDER BY due_date",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Count open loans for an item
    pub async fn count_open_for_item(&self, item_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE item_id = $1 AND return_date IS NULL",
        )
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Create a new open loan
    pub async fn create(&self, loan: &IssueLoan, issue_date: DateTime<Utc>) -> AppResult<Loan> {
        let created = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (item_id, member_id, issue_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(loan.item_id)
        .bind(loan.member_id)
        .bind(issue_date)
        .bind(loan.due_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Mark a loan as returned. Returns false if the loan was already
    /// returned, without touching the row.
    ///
    /// The `return_date IS NULL` guard makes the mark a single serializable
    /// step: a replayed return observes zero affected rows instead of stamping
    /// a second date, which is what keeps the paired ledger increment unique.
    pub async fn mark_returned(&self, id: Uuid, returned_at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE loans SET return_date = $2 WHERE id = $1 AND return_date IS NULL",
        )
        .bind(id)
        .bind(returned_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
