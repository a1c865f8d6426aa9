//! Catalog management service: authors and items

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        item::{CreateItem, Item, UpdateItem},
        stock_entry::StockEntry,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // Authors

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn get_author(&self, id: Uuid) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        self.repository.authors.create(&author).await
    }

    pub async fn update_author(&self, id: Uuid, author: UpdateAuthor) -> AppResult<Author> {
        self.repository.authors.update(id, &author).await
    }

    pub async fn delete_author(&self, id: Uuid) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    // Items

    pub async fn list_items(&self) -> AppResult<Vec<Item>> {
        self.repository.items.list().await
    }

    pub async fn get_item(&self, id: Uuid) -> AppResult<Item> {
        self.repository.items.get_by_id(id).await
    }

    /// Create a catalog item. Copies arrive through stock intake, never here.
    pub async fn create_item(&self, item: CreateItem) -> AppResult<Item> {
        if let Some(author_id) = item.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }
        self.repository.items.create(&item).await
    }

    pub async fn update_item(&self, id: Uuid, item: UpdateItem) -> AppResult<Item> {
        if let Some(author_id) = item.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }
        self.repository.items.update(id, &item).await
    }

    pub async fn delete_item(&self, id: Uuid) -> AppResult<()> {
        self.repository.items.delete(id).await
    }

    /// Intake history for an item
    pub async fn item_stock_history(&self, id: Uuid) -> AppResult<Vec<StockEntry>> {
        self.repository.items.get_by_id(id).await?;
        self.repository.stock_entries.list_for_item(id).await
    }
}
