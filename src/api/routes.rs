use crate::auth::jwt::TokenService;
use crate::utils::toml_config::CorsConfig;
use crate::AppState;
use axum::{
    http::HeaderValue,
    middleware,
    response::Redirect,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(token_service: Arc<TokenService>) -> Router<AppState> {
    let public_routes = Router::new()
        // Public routes (no auth required)
        .route("/login", post(crate::api::handlers::auth::login))
        .route(
            "/users",
            get(crate::api::handlers::users::list_users)
                .post(crate::api::handlers::users::create_user),
        )
        .route("/users/{id}", get(crate::api::handlers::users::get_user));

    let protected_routes = Router::new()
        // Protected routes (auth required)
        .route(
            "/users/logged-in-user",
            get(crate::api::handlers::users::logged_in_user),
        )
        .route(
            "/posts",
            get(crate::api::handlers::posts::list_posts)
                .post(crate::api::handlers::posts::create_post),
        )
        .route(
            "/posts/{id}",
            get(crate::api::handlers::posts::get_post)
                .put(crate::api::handlers::posts::update_post)
                .delete(crate::api::handlers::posts::delete_post),
        )
        .route("/vote", post(crate::api::handlers::votes::vote))
        .layer(middleware::from_fn(move |req, next| {
            crate::auth::middleware::auth_middleware(token_service.clone(), req, next)
        }));

    // The static segment wins over `{id}`, so the protected route is reachable
    public_routes.merge(protected_routes)
}

/// Builds the CORS layer. A `"*"` entry allows any origin; unparsable
/// origins are skipped with a warning.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// The complete application: API routes, health check, docs, CORS and
/// request tracing, bound to `state`.
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    let router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(create_router(state.token_service.clone()));

    #[cfg(feature = "swagger-ui")]
    let router = router
        .route("/", get(|| async { Redirect::temporary("/docs") }))
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", crate::api::openapi::openapi()),
        );

    #[cfg(not(feature = "swagger-ui"))]
    let router = router
        .route(
            "/",
            get(|| async { Redirect::temporary("/api-docs/openapi.json") }),
        )
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(crate::api::openapi::openapi()) }),
        );

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
