//! Repository layer for database operations
//!
//! Services talk to storage through the [`BookStore`] and [`UserStore`]
//! traits. The Postgres implementations rely on the `UNIQUE` constraints
//! on `books.isbn` and `users.email`; a violated constraint surfaces as
//! [`AppError::DuplicateIsbn`] or [`AppError::DuplicateEmail`].

pub mod books;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookInput, BookQuery, NewUser, User},
};

/// Persistence contract for books
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books, ordered by id
    async fn list(&self) -> AppResult<Vec<Book>>;

    /// Books matching every non-empty filter of `query`
    async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>>;

    /// Insert with a fresh id and the current timestamp
    async fn create(&self, input: &BookInput) -> AppResult<Book>;

    /// Overwrite the mutable fields; `None` when no book has `id`
    async fn update(&self, id: i32, input: &BookInput) -> AppResult<Option<Book>>;

    /// `false` when no row was removed
    async fn delete(&self, id: i32) -> AppResult<bool>;
}

/// Persistence contract for users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<User>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Exact match on the normalized email
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn create(&self, user: &NewUser) -> AppResult<User>;

    /// Persist every field except `id` and `creation_date`; `None` when the
    /// user no longer exists
    async fn update(&self, user: &User) -> AppResult<Option<User>>;
}

/// Postgres-backed repositories sharing one connection pool
#[derive(Clone)]
pub struct Repository {
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool),
        }
    }
}

/// Translate a unique violation on `constraint` into `duplicate`; every
/// other database error is passed through.
pub(crate) fn map_unique_violation(err: sqlx::Error, constraint: &str, duplicate: AppError) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() && db_err.constraint().map_or(true, |c| c == constraint) {
            return duplicate;
        }
    }
    AppError::Database(err)
}
