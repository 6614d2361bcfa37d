//! Data models for Bookshelf

pub mod book;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookInput, BookQuery};
pub use user::{CreateUser, NewUser, Role, UpdateUser, User};
