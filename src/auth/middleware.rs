use crate::auth::jwt::TokenService;
use crate::types::{AppError, AuthFailure};
use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Id of the user a verified bearer token was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Rejects the request unless it carries a valid bearer token, then records
/// the caller in the request extensions.
pub async fn auth_middleware(
    token_service: Arc<TokenService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        tracing::debug!("request without bearer token");
        AppError::Auth("Could not validate credentials".to_string())
    })?;

    let user_id = token_service.verify(token).map_err(AppError::from)?;

    req.extensions_mut().insert(CurrentUser(user_id));

    Ok(next.run(req).await)
}

/// Extractor for the authenticated user id set by [`auth_middleware`].
pub struct AuthUser(pub i64);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .map(|CurrentUser(id)| AuthUser(*id))
            .ok_or_else(|| AppError::from(AuthFailure::Malformed))
    }
}
