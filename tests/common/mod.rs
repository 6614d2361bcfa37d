//! Shared fixtures: in-memory stores honouring the same uniqueness contract
//! as the Postgres schema.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use bookshelf_server::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{Book, BookInput, BookQuery, CreateUser, NewUser, Role, User},
    repository::{BookStore, UserStore},
    services::Services,
    AppState,
};

pub const TEST_SECRET: &str = "integration-test-secret-long-enough-for-hs256";

struct Table<T> {
    next_id: i32,
    rows: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryBookStore {
    table: Mutex<Table<Book>>,
}

impl MemoryBookStore {
    pub async fn count_isbn(&self, isbn: &str) -> usize {
        self.table.lock().await.rows.iter().filter(|b| b.isbn == isbn).count()
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn list(&self) -> AppResult<Vec<Book>> {
        Ok(self.table.lock().await.rows.clone())
    }

    async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().filter(|b| query.matches(b)).cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().find(|b| b.id == id).cloned())
    }

    async fn create(&self, input: &BookInput) -> AppResult<Book> {
        let mut table = self.table.lock().await;
        if table.rows.iter().any(|b| b.isbn == input.isbn) {
            return Err(AppError::DuplicateIsbn);
        }
        let book = Book {
            id: table.allocate_id(),
            title: input.title.clone(),
            author: input.author.clone(),
            isbn: input.isbn.clone(),
            category: input.category.clone(),
            status: input.status.clone(),
            creation_date: Utc::now(),
        };
        table.rows.push(book.clone());
        Ok(book)
    }

    async fn update(&self, id: i32, input: &BookInput) -> AppResult<Option<Book>> {
        let mut table = self.table.lock().await;
        if !table.rows.iter().any(|b| b.id == id) {
            return Ok(None);
        }
        if table.rows.iter().any(|b| b.id != id && b.isbn == input.isbn) {
            return Err(AppError::DuplicateIsbn);
        }
        let book = table
            .rows
            .iter_mut()
            .find(|b| b.id == id)
            .map(|b| {
                b.title = input.title.clone();
                b.author = input.author.clone();
                b.isbn = input.isbn.clone();
                b.category = input.category.clone();
                b.status = input.status.clone();
                b.clone()
            });
        Ok(book)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut table = self.table.lock().await;
        let before = table.rows.len();
        table.rows.retain(|b| b.id != id);
        Ok(table.rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    table: Mutex<Table<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.table.lock().await.rows.clone())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let mut table = self.table.lock().await;
        if table.rows.iter().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateEmail);
        }
        let user = User {
            id: table.allocate_id(),
            name: user.name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            active: user.active,
            creation_date: Utc::now(),
        };
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> AppResult<Option<User>> {
        let mut table = self.table.lock().await;
        if table.rows.iter().any(|u| u.id != user.id && u.email == user.email) {
            return Err(AppError::DuplicateEmail);
        }
        let updated = table.rows.iter_mut().find(|u| u.id == user.id).map(|stored| {
            let creation_date = stored.creation_date;
            *stored = User {
                creation_date,
                ..user.clone()
            };
            stored.clone()
        });
        Ok(updated)
    }
}

pub struct TestApp {
    pub services: Services,
    pub books: Arc<MemoryBookStore>,
    pub users: Arc<MemoryUserStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let books = Arc::new(MemoryBookStore::default());
        let users = Arc::new(MemoryUserStore::default());
        let services = Services::from_stores(
            books.clone(),
            users.clone(),
            &AuthConfig::new(TEST_SECRET, 60),
        );
        Self { services, books, users }
    }

    pub fn state(&self) -> AppState {
        AppState {
            services: Arc::new(self.services.clone()),
        }
    }

    /// Register a user and return it together with a fresh token.
    pub async fn user_with_token(&self, email: &str, role: Role, active: bool) -> (User, String) {
        let user = self
            .services
            .users
            .register(new_user(email, "secret123", Some(role), Some(active)))
            .await
            .expect("register");
        let token = self
            .services
            .users
            .login(email, "secret123")
            .await
            .unwrap_or_default();
        (user, token)
    }
}

pub fn book_input(title: &str, author: &str, isbn: &str, category: &str) -> BookInput {
    BookInput {
        title: title.to_string(),
        author: author.to_string(),
        isbn: isbn.to_string(),
        category: category.to_string(),
        status: "available".to_string(),
    }
}

pub fn new_user(email: &str, password: &str, role: Option<Role>, active: Option<bool>) -> CreateUser {
    CreateUser {
        name: "Ana".to_string(),
        last_name: "García".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role,
        active,
    }
}
