//! Authentication building blocks: password hashing, access tokens and the
//! guard resolving callers of protected operations.

pub mod guard;
pub mod password;
pub mod token;

pub use guard::{AuthContext, AuthGuard};
pub use token::TokenService;
