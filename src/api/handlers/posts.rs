//! Post CRUD handlers.
//!
//! Every route here sits behind the bearer middleware. Anyone signed in can
//! read posts; only the owner can change or delete one.

use crate::{
    auth::middleware::AuthUser,
    types::{AppError, PostCreate, PostQuery, PostResponse, PostWithVotes, Result},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

fn validate_post(post: &PostCreate) -> Result<()> {
    if post.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()));
    }
    if post.content.trim().is_empty() {
        return Err(AppError::InvalidInput("Content must not be empty".to_string()));
    }
    Ok(())
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Post with id: {} not found", id))
}

/// Looks up a post and checks it belongs to `user_id`.
async fn owned_post(state: &AppState, id: i64, user_id: i64) -> Result<PostWithVotes> {
    let post = state.turso.get_post(id).await?.ok_or_else(|| not_found(id))?;

    if post.post.owner_id != user_id {
        return Err(AppError::Forbidden(
            "Not authorized to perform requested action".to_string(),
        ));
    }

    Ok(post)
}

/// List posts with their vote counts.
#[utoipa::path(
    get,
    path = "/posts",
    params(PostQuery),
    responses(
        (status = 200, description = "Posts", body = Vec<PostWithVotes>),
        (status = 400, description = "Invalid paging"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "posts",
    security(("bearer" = []))
)]
pub async fn list_posts(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(query): Query<PostQuery>,
) -> Result<Json<Vec<PostWithVotes>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let skip = query.skip.unwrap_or(0);

    if !(0..=MAX_LIMIT).contains(&limit) || skip < 0 {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 0 and {} and skip must not be negative",
            MAX_LIMIT
        )));
    }

    let search = query.search.unwrap_or_default();
    let posts = state.turso.list_posts(limit, skip, &search).await?;

    Ok(Json(posts))
}

/// Get a single post with its vote count.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post", body = PostWithVotes),
        (status = 404, description = "Post not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "posts",
    security(("bearer" = []))
)]
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<PostWithVotes>> {
    let post = state.turso.get_post(id).await?.ok_or_else(|| not_found(id))?;

    Ok(Json(post))
}

/// Create a post owned by the caller.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = PostCreate,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "posts",
    security(("bearer" = []))
)]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<PostCreate>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    validate_post(&payload)?;

    let post = state.turso.create_post(user_id, &payload).await?;
    tracing::info!(post_id = post.id, owner_id = user_id, "post created");

    Ok((StatusCode::CREATED, Json(post)))
}

/// Replace a post's title, content and published flag.
#[utoipa::path(
    put,
    path = "/posts/{id}",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    request_body = PostCreate,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Post not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "posts",
    security(("bearer" = []))
)]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<PostCreate>,
) -> Result<Json<PostResponse>> {
    validate_post(&payload)?;
    owned_post(&state, id, user_id).await?;

    if !state.turso.update_post(id, &payload).await? {
        return Err(not_found(id));
    }

    let updated = state.turso.get_post(id).await?.ok_or_else(|| not_found(id))?;

    Ok(Json(updated.post))
}

/// Delete a post and its votes.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Post not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "posts",
    security(("bearer" = []))
)]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    owned_post(&state, id, user_id).await?;

    if !state.turso.delete_post(id).await? {
        return Err(not_found(id));
    }
    tracing::info!(post_id = id, "post deleted");

    Ok(StatusCode::NO_CONTENT)
}
