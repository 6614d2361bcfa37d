//! User management endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::user::{UpdateUser, User},
    AppState,
};

use super::{
    extract::{JsonBody, PathParam},
    AuthenticatedUser,
};

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/usuarios",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = Vec<User>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.list_users(&caller).await?;
    Ok(Json(users))
}

/// Get a user profile (self or admin)
#[utoipa::path(
    get,
    path = "/usuarios/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_profile(&caller, id).await?;
    Ok(Json(user))
}

/// Update a user profile (self or admin; role and active are admin-only)
#[utoipa::path(
    put,
    path = "/usuarios/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Email already registered"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
    JsonBody(input): JsonBody<UpdateUser>,
) -> AppResult<Json<User>> {
    let updated = state.services.users.update_profile(&caller, id, input).await?;
    Ok(Json(updated))
}
