use crate::{
    auth::password::verify_password_blocking,
    types::{AppError, LoginForm, Result, TokenResponse},
    AppState,
};
use axum::{extract::State, Form, Json};

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>> {
    let LoginForm { username, password } = form;

    // Unknown email and wrong password must look the same to the caller
    let Some(user) = state.turso.get_user_by_email(username.trim()).await? else {
        tracing::info!("login rejected: unknown email");
        return Err(AppError::Auth("Invalid credentials".to_string()));
    };

    if !verify_password_blocking(password, user.password_hash).await {
        tracing::info!(user_id = user.id, "login rejected: password mismatch");
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    let access_token = state.token_service.mint(user.id)?;
    tracing::info!(user_id = user.id, "login successful");

    Ok(Json(TokenResponse::bearer(access_token)))
}
