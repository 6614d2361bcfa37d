//! Registration, login and profile management

use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{
        password::{hash_password, verify_password_or_dummy},
        AuthContext, TokenService,
    },
    error::{AppError, AppResult},
    models::{user::normalize_email, CreateUser, NewUser, Role, UpdateUser, User},
    repository::UserStore,
};

#[derive(Clone)]
pub struct UsersService {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl UsersService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Register a new account. Role defaults to `usuario`, active to true.
    pub async fn register(&self, mut input: CreateUser) -> AppResult<User> {
        input.email = normalize_email(&input.email);
        input.validate()?;

        let new_user = NewUser {
            name: input.name,
            last_name: input.last_name,
            email: input.email,
            password_hash: hash_password(&input.password)?,
            role: input.role.unwrap_or_default(),
            active: input.active.unwrap_or(true),
        };

        let user = self.store.create(&new_user).await?;
        tracing::info!("Registered user id={} role={}", user.id, user.role);
        Ok(user)
    }

    /// Check credentials and issue an access token.
    ///
    /// Unknown email and wrong password yield the same error.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let user = self.store.get_by_email(&normalize_email(email)).await?;

        // Unknown accounts still pay for one argon2 verification.
        let verified =
            verify_password_or_dummy(password, user.as_ref().map(|u| u.password_hash.as_str()))?;
        let user = match user {
            Some(user) if verified => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        if !user.active {
            tracing::warn!("Login refused for inactive user id={}", user.id);
            return Err(AppError::InactiveUser);
        }

        let token = self.tokens.issue(user.id, self.tokens.default_ttl())?;
        tracing::info!("User id={} logged in", user.id);
        Ok(token)
    }

    /// All users (admin only)
    pub async fn list_users(&self, caller: &AuthContext) -> AppResult<Vec<User>> {
        caller.require_role(Role::Admin)?;
        self.store.list().await
    }

    pub async fn get_profile(&self, caller: &AuthContext, target_id: i32) -> AppResult<User> {
        caller.require_self_or_admin(target_id)?;
        self.find(target_id).await
    }

    /// Update a profile.
    ///
    /// Name, last name, email and password are written for any authorized
    /// caller; role and active are only applied for admin callers and
    /// silently ignored otherwise.
    pub async fn update_profile(
        &self,
        caller: &AuthContext,
        target_id: i32,
        mut input: UpdateUser,
    ) -> AppResult<User> {
        caller.require_self_or_admin(target_id)?;
        input.email = normalize_email(&input.email);
        input.validate()?;

        let mut user = self.find(target_id).await?;

        user.name = input.name;
        user.last_name = input.last_name;
        user.email = input.email;
        if let Some(ref password) = input.password {
            user.password_hash = hash_password(password)?;
        }

        if caller.is_admin() {
            if let Some(role) = input.role {
                user.role = role;
            }
            if let Some(active) = input.active {
                user.active = active;
            }
        }

        let updated = self
            .store
            .update(&user)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        tracing::info!("User id={} updated by id={}", updated.id, caller.user_id());
        Ok(updated)
    }

    async fn find(&self, id: i32) -> AppResult<User> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
