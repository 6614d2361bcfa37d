//! Book inventory service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookInput, BookQuery},
    repository::BookStore,
};

#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.store.list().await
    }

    /// Filtered search; an empty query is the same as [`list`](Self::list).
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        if query.is_empty() {
            return self.store.list().await;
        }
        self.store.search(query).await
    }

    pub async fn create(&self, input: BookInput) -> AppResult<Book> {
        input.validate()?;

        let book = self.store.create(&input).await?;
        tracing::info!("Created book id={} isbn={}", book.id, book.isbn);
        Ok(book)
    }

    pub async fn get(&self, id: i32) -> AppResult<Book> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Overwrite every mutable field of book `id`.
    pub async fn update(&self, id: i32, input: BookInput) -> AppResult<Book> {
        input.validate()?;

        let book = self
            .store
            .update(id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        tracing::info!("Updated book id={}", book.id);
        Ok(book)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }
}
