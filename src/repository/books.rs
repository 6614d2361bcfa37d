//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{map_unique_violation, BookStore};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookInput, BookQuery},
};

const ISBN_CONSTRAINT: &str = "books_isbn_key";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Build an ILIKE pattern matching `value` as a literal substring.
pub(crate) fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        let filters = [
            ("title", query.title()),
            ("author", query.author()),
            ("category", query.category()),
        ];
        for (column, value) in filters {
            if let Some(value) = value {
                params.push(like_pattern(value));
                conditions.push(format!("{} ILIKE ${} ESCAPE '\\'", column, params.len()));
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let select_query = format!("SELECT * FROM books {} ORDER BY id", where_clause);

        let mut builder = sqlx::query_as::<_, Book>(&select_query);
        for param in &params {
            builder = builder.bind(param);
        }

        Ok(builder.fetch_all(&self.pool).await?)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn create(&self, input: &BookInput) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, category, status, creation_date)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(&input.isbn)
        .bind(&input.category)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, ISBN_CONSTRAINT, AppError::DuplicateIsbn))
    }

    async fn update(&self, id: i32, input: &BookInput) -> AppResult<Option<Book>> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, author = $3, isbn = $4, category = $5, status = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.author)
        .bind(&input.isbn)
        .bind(&input.category)
        .bind(&input.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, ISBN_CONSTRAINT, AppError::DuplicateIsbn))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
