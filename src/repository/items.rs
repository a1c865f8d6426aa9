//! Items repository: catalog rows and the inventory ledger

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::item::{CreateItem, Item, UpdateItem},
};

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get item by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))
    }

    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM items WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// List all items
    pub async fn list(&self) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Create a new item. Quantity starts at 0; copies arrive via stock intake.
    pub async fn create(&self, item: &CreateItem) -> AppResult<Item> {
        let created = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (title, author_id, genre, quantity)
            VALUES ($1, $2, $3, 0)
            RETURNING *
            "#,
        )
        .bind(&item.title)
        .bind(item.author_id)
        .bind(&item.genre)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update descriptive fields. Quantity is deliberately not updatable here.
    pub async fn update(&self, id: Uuid, item: &UpdateItem) -> AppResult<Item> {
        let updated = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items SET
                title = COALESCE($2, title),
                author_id = COALESCE($3, author_id),
                genre = COALESCE($4, genre)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&item.title)
        .bind(item.author_id)
        .bind(&item.genre)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))?;
        Ok(updated)
    }

    /// Delete an item
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item {} not found", id)));
        }
        Ok(())
    }

    /// Atomically adjust an item's available quantity and return the new value.
    ///
    /// The read-check-write is one conditional UPDATE, so two concurrent
    /// decrements against the last copy can never both succeed: the row guard
    /// `quantity + delta >= 0` is evaluated under the row lock.
    pub async fn adjust_quantity(&self, id: Uuid, delta: i32) -> AppResult<i32> {
        let new_quantity = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE items
            SET quantity = quantity + $2
            WHERE id = $1 AND quantity + $2 >= 0
            RETURNING quantity
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        match new_quantity {
            Some(quantity) => Ok(quantity),
            // The guard failed: either the item is gone or the balance is short
            None => {
                if self.exists(id).await? {
                    Err(AppError::InsufficientInventory(format!(
                        "Item {} has insufficient copies for adjustment {}",
                        id, delta
                    )))
                } else {
                    Err(AppError::NotFound(format!("Item {} not found", id)))
                }
            }
        }
    }
}
