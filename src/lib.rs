//! # Postvote
//!
//! A small blogging and voting REST API. Users register with an email and
//! password, sign in for a short-lived bearer token, then write posts and
//! vote on them.
//!
//! ## Overview
//!
//! Postvote can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `postvote-server` binary
//! 2. **As a library** - Build the router into your own Rust project
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use postvote::{api::routes::build_app, AppState, DatabaseProvider, PostvoteConfig};
//! use postvote::auth::jwt::{SigningSecret, TokenService};
//! use std::sync::Arc;
//!
//! let config = PostvoteConfig::default();
//! let turso = DatabaseProvider::Memory.create_client().await?;
//! let tokens = TokenService::new(
//!     SigningSecret::new(std::env::var("SECRET_KEY")?),
//!     config.auth.token_lifetime(),
//! );
//!
//! let app = build_app(AppState {
//!     config: Arc::new(config),
//!     turso: Arc::new(turso),
//!     token_service: Arc::new(tokens),
//! });
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `turso` | Remote Turso database |
//! | `swagger-ui` | Interactive API docs at `/docs` |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - Password hashing, session tokens and middleware
//! - [`cli`] - Command-line interface for the server binary
//! - [`db`] - Database access (SQLite, Turso) and migrations
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Password custody, session tokens and middleware.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Database clients (Turso/SQLite) and migrations.
pub mod db;
/// Core types (requests, responses, errors).
#[allow(missing_docs)]
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use auth::jwt::{SigningSecret, TokenService};
pub use db::{DatabaseProvider, TursoClient};
pub use types::{AppError, Result};
pub use utils::toml_config::PostvoteConfig;

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Infrastructure configuration loaded from `postvote.toml`
    pub config: Arc<PostvoteConfig>,
    /// Database client
    pub turso: Arc<TursoClient>,
    /// Session token issuer and verifier
    pub token_service: Arc<TokenService>,
}
