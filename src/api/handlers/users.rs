//! User registration and lookup handlers.

use crate::{
    auth::{middleware::AuthUser, password::hash_password_blocking},
    types::{AppError, Result, UserCreate, UserResponse},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// Shape check only: one `@`, something on both sides, a dot in the domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid email or password too short"),
        (status = 409, description = "User with this email already exists")
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let UserCreate { email, password } = payload;
    let email = email.trim().to_string();

    if !is_valid_email(&email) {
        return Err(AppError::InvalidInput("A valid email is required".to_string()));
    }

    let min_len = state.config.auth.min_password_length;
    if password.chars().count() < min_len {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {} characters",
            min_len
        )));
    }

    if state.turso.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password_blocking(password).await?;
    let user = state.turso.create_user(&email, &password_hash).await?;
    tracing::info!(user_id = user.id, "user registered");

    Ok((StatusCode::CREATED, Json(UserResponse::try_from(&user)?)))
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>)
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>> {
    let users = state
        .turso
        .list_users()
        .await?
        .iter()
        .map(UserResponse::try_from)
        .collect::<Result<Vec<_>>>()?;

    Ok(Json(users))
}

/// The user the bearer token belongs to
#[utoipa::path(
    get,
    path = "/users/logged-in-user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn logged_in_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>> {
    // A token can outlive its user; treat that like any other bad credential
    let user = state
        .turso
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::Auth("Could not validate credentials".to_string()))?;

    Ok(Json(UserResponse::try_from(&user)?))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>> {
    let user = state
        .turso
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id: {} not found", id)))?;

    Ok(Json(UserResponse::try_from(&user)?))
}
