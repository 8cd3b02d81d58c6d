//! Relational store for users, posts and votes.
//!
//! - **Turso/SQLite** via `libsql`: in-memory, local file, or remote Turso
//! - **Migrations**: versioned schema changes applied when a client opens
//!
//! Enable the remote backend via Cargo features:
//! ```toml
//! postvote-server = { version = "*", features = ["turso"] }
//! ```

#![allow(missing_docs)]

pub mod migrations;
pub mod provider;
pub mod turso;

// Re-exports
pub use provider::DatabaseProvider;
pub use turso::{TursoClient, User};
