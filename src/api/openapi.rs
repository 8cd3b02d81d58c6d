use crate::api::handlers::{auth, posts, users, votes};
use crate::types::{
    LoginForm, PostCreate, PostResponse, PostWithVotes, TokenResponse, UserCreate, UserResponse,
    VoteRequest, VoteResponse,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        users::create_user,
        users::list_users,
        users::logged_in_user,
        users::get_user,
        posts::list_posts,
        posts::get_post,
        posts::create_post,
        posts::update_post,
        posts::delete_post,
        votes::vote,
    ),
    components(schemas(
        LoginForm,
        TokenResponse,
        UserCreate,
        UserResponse,
        PostCreate,
        PostResponse,
        PostWithVotes,
        VoteRequest,
        VoteResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Password login and bearer tokens"),
        (name = "users", description = "User registration and lookup"),
        (name = "posts", description = "Posts and their vote counts"),
        (name = "votes", description = "Casting and withdrawing votes")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// The generated OpenAPI document.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
