//! Registration and login endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{CreateUser, User},
    AppState,
};

use super::extract::{FormBody, JsonBody};

/// OAuth2 password-flow login form
#[derive(Deserialize, ToSchema)]
pub struct LoginForm {
    /// Email address
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/registro",
    tag = "auth",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Email already registered"),
        (status = 422, description = "Invalid input")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.users.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange email and password for an access token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Incorrect email or password"),
        (status = 403, description = "Inactive user")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    FormBody(form): FormBody<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let access_token = state
        .services
        .users
        .login(&form.username, &form.password)
        .await?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
