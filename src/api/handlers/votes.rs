use crate::{
    auth::middleware::AuthUser,
    types::{AppError, Result, VoteRequest, VoteResponse},
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};

/// Cast (`dir = 1`) or withdraw (`dir = 0`) the caller's vote on a post
#[utoipa::path(
    post,
    path = "/vote",
    request_body = VoteRequest,
    responses(
        (status = 201, description = "Vote recorded or removed", body = VoteResponse),
        (status = 400, description = "dir must be 0 or 1"),
        (status = 404, description = "Post or vote not found"),
        (status = 409, description = "Already voted"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "votes",
    security(("bearer" = []))
)]
pub async fn vote(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<VoteRequest>,
) -> Result<(StatusCode, Json<VoteResponse>)> {
    let VoteRequest { post_id, dir } = payload;

    if !(0..=1).contains(&dir) {
        return Err(AppError::InvalidInput("dir must be 0 or 1".to_string()));
    }

    if state.turso.get_post(post_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Post with id: {} does not exist",
            post_id
        )));
    }

    let message = if dir == 1 {
        if state.turso.vote_exists(user_id, post_id).await? {
            return Err(AppError::Conflict(format!(
                "User {} has already voted on post {}",
                user_id, post_id
            )));
        }
        state.turso.add_vote(user_id, post_id).await?;
        "Successfully added vote"
    } else {
        if !state.turso.remove_vote(user_id, post_id).await? {
            return Err(AppError::NotFound("Vote does not exist".to_string()));
        }
        "Successfully deleted vote"
    };

    tracing::debug!(user_id, post_id, dir, "vote updated");

    Ok((
        StatusCode::CREATED,
        Json(VoteResponse {
            message: message.to_string(),
        }),
    ))
}
