//! Caller resolution and role checks

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Role, User},
    repository::UserStore,
};

use super::token::TokenService;

/// Identity of the caller of a protected operation, freshly read from the
/// user store for the current request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
}

impl AuthContext {
    pub fn user_id(&self) -> i32 {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    pub fn require_role(&self, role: Role) -> AppResult<()> {
        if self.user.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("{} privileges required", role)))
        }
    }

    /// Allow admins, or the user acting on their own record.
    pub fn require_self_or_admin(&self, target_user_id: i32) -> AppResult<()> {
        if self.is_admin() || self.user.id == target_user_id {
            Ok(())
        } else {
            Err(AppError::Forbidden("Not authorized".to_string()))
        }
    }
}

#[derive(Clone)]
pub struct AuthGuard {
    tokens: TokenService,
    users: Arc<dyn UserStore>,
}

impl AuthGuard {
    pub fn new(tokens: TokenService, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    /// Resolve a bearer token to an active user.
    ///
    /// Every failure (bad or expired token, unknown or inactive user) is
    /// reported as `Unauthorized`.
    pub async fn resolve_caller(&self, token: &str) -> AppResult<AuthContext> {
        let user_id = self.tokens.verify(token).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            AppError::Unauthorized
        })?;

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| {
                tracing::debug!("Token subject {} no longer exists", user_id);
                AppError::Unauthorized
            })?;

        if !user.active {
            tracing::debug!("Token subject {} is inactive", user_id);
            return Err(AppError::Unauthorized);
        }

        Ok(AuthContext { user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AuthConfig, repository::MockUserStore};
    use chrono::{Duration, Utc};
    use mockall::predicate::eq;

    fn user(id: i32, role: Role, active: bool) -> User {
        User {
            id,
            name: "Ana".to_string(),
            last_name: "García".to_string(),
            email: format!("user{}@example.com", id),
            password_hash: String::new(),
            role,
            active,
            creation_date: Utc::now(),
        }
    }

    fn tokens() -> TokenService {
        TokenService::new(&AuthConfig::new("guard-test-secret-long-enough-for-hs256", 60))
    }

    fn guard_with(store: MockUserStore) -> AuthGuard {
        AuthGuard::new(tokens(), Arc::new(store))
    }

    #[tokio::test]
    async fn resolves_active_user() {
        let mut store = MockUserStore::new();
        store
            .expect_get_by_id()
            .with(eq(7))
            .returning(|id| Ok(Some(user(id, Role::Usuario, true))));

        let token = tokens().issue(7, Duration::minutes(5)).unwrap();
        let ctx = guard_with(store).resolve_caller(&token).await.unwrap();
        assert_eq!(ctx.user_id(), 7);
        assert_eq!(ctx.role(), Role::Usuario);
    }

    #[tokio::test]
    async fn inactive_user_is_unauthorized() {
        let mut store = MockUserStore::new();
        store
            .expect_get_by_id()
            .returning(|id| Ok(Some(user(id, Role::Admin, false))));

        let token = tokens().issue(7, Duration::minutes(5)).unwrap();
        let err = guard_with(store).resolve_caller(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let mut store = MockUserStore::new();
        store.expect_get_by_id().returning(|_| Ok(None));

        let token = tokens().issue(7, Duration::minutes(5)).unwrap();
        let err = guard_with(store).resolve_caller(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn expired_token_skips_lookup() {
        let mut store = MockUserStore::new();
        store.expect_get_by_id().never();

        let token = tokens().issue(7, Duration::zero()).unwrap();
        let err = guard_with(store).resolve_caller(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn require_role_checks_exact_role() {
        let admin = AuthContext { user: user(1, Role::Admin, true) };
        let regular = AuthContext { user: user(2, Role::Usuario, true) };

        assert!(admin.require_role(Role::Admin).is_ok());
        assert!(matches!(regular.require_role(Role::Admin), Err(AppError::Forbidden(_))));
        assert!(regular.require_role(Role::Usuario).is_ok());
    }

    #[test]
    fn self_or_admin() {
        let admin = AuthContext { user: user(1, Role::Admin, true) };
        let regular = AuthContext { user: user(2, Role::Usuario, true) };

        assert!(admin.require_self_or_admin(2).is_ok());
        assert!(regular.require_self_or_admin(2).is_ok());
        assert!(matches!(regular.require_self_or_admin(1), Err(AppError::Forbidden(_))));
    }
}
