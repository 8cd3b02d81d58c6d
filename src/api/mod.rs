//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for Postvote, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//! - [`api::openapi`](crate::api::openapi) - Generated OpenAPI document
//!
//! # API Endpoints
//!
//! ## Authentication
//! - `POST /login` - Exchange email and password (form encoded) for a bearer token
//!
//! ## Users
//! - `POST /users` - Register a new user
//! - `GET /users` - List users
//! - `GET /users/{id}` - Get a user
//! - `GET /users/logged-in-user` - The user the token belongs to
//!
//! ## Posts
//! - `GET /posts` - List posts with vote counts (`limit`, `skip`, `search`)
//! - `POST /posts` - Create a post
//! - `GET /posts/{id}` - Get a post
//! - `PUT /posts/{id}` - Update a post you own
//! - `DELETE /posts/{id}` - Delete a post you own
//!
//! ## Votes
//! - `POST /vote` - Cast (`dir = 1`) or withdraw (`dir = 0`) a vote
//!
//! ## Health
//! - `GET /health` - Health check endpoint
//!
//! # Authentication
//!
//! Posts, votes and `logged-in-user` require a valid token in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # OpenAPI Documentation
//!
//! The document is served at `/api-docs/openapi.json`. When the `swagger-ui`
//! feature is enabled, interactive documentation is available at `/docs`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// OpenAPI document generation.
pub mod openapi;
/// Router configuration and route definitions.
pub mod routes;
