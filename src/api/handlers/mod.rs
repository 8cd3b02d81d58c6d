//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Login handler.
pub mod auth;
/// Post CRUD handlers.
pub mod posts;
/// User registration and lookup handlers.
pub mod users;
/// Voting handler.
pub mod votes;
