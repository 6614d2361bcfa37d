//! Users repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{map_unique_violation, UserStore};
use crate::{
    error::{AppError, AppResult},
    models::{NewUser, User},
};

const EMAIL_CONSTRAINT: &str = "users_email_key";

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UsersRepository {
    async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: &NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, last_name, email, password_hash, role, active, creation_date)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, EMAIL_CONSTRAINT, AppError::DuplicateEmail))
    }

    async fn update(&self, user: &User) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, last_name = $3, email = $4, password_hash = $5, role = $6, active = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, EMAIL_CONSTRAINT, AppError::DuplicateEmail))
    }
}
