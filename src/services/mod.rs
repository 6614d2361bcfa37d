//! Business logic services

pub mod books;
pub mod users;

use std::sync::Arc;

use crate::{
    auth::{AuthGuard, TokenService},
    config::AuthConfig,
    repository::{BookStore, Repository, UserStore},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BookService,
    pub users: users::UsersService,
    pub guard: AuthGuard,
}

impl Services {
    /// Create all services on top of the Postgres repository
    pub fn new(repository: Repository, auth_config: &AuthConfig) -> Self {
        Self::from_stores(
            Arc::new(repository.books),
            Arc::new(repository.users),
            auth_config,
        )
    }

    /// Create all services on top of arbitrary stores
    pub fn from_stores(
        books: Arc<dyn BookStore>,
        users: Arc<dyn UserStore>,
        auth_config: &AuthConfig,
    ) -> Self {
        let tokens = TokenService::new(auth_config);
        Self {
            books: books::BookService::new(books),
            users: users::UsersService::new(users.clone(), tokens.clone()),
            guard: AuthGuard::new(tokens, users),
        }
    }
}
