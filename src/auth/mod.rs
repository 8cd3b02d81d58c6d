//! Credential and Session Authority
//!
//! This module turns passwords into stored hashes, checks them at login, and
//! issues and checks the bearer tokens every protected route requires.
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2id hashing and verification
//! - [`auth::jwt`](crate::auth::jwt) - HS256 session token minting and verification
//! - [`auth::middleware`](crate::auth::middleware) - Axum bearer middleware and extractor
//!
//! # Security Features
//!
//! - **Password Hashing**: Argon2id (memory-hard) with a fresh salt per hash,
//!   stored as a self-describing PHC string
//! - **Session Tokens**: HS256 with the algorithm pinned on verification and
//!   a fixed lifetime from configuration
//! - **Uniform Failures**: a malformed hash reads as a wrong password, and every
//!   token failure becomes the same 401
//!
//! # Usage
//!
//! ```ignore
//! use postvote::auth::{jwt::{SigningSecret, TokenService}, password};
//!
//! let stored = password::hash_password("hunter22")?;
//! assert!(password::verify_password("hunter22", &stored));
//!
//! let tokens = TokenService::new(SigningSecret::new(secret), chrono::Duration::minutes(30));
//! let token = tokens.mint(user_id)?;
//! assert_eq!(tokens.verify(&token), Ok(user_id));
//! ```
//!
//! # Configuration
//!
//! Configure via `postvote.toml`:
//! ```toml
//! [auth]
//! jwt_secret_env = "SECRET_KEY"        # env var holding the signing secret
//! access_token_expire_minutes = 30     # token lifetime
//! ```

/// Session token minting and verification.
pub mod jwt;
/// Authentication middleware and extractors for protected routes.
pub mod middleware;
/// Password hashing and verification.
pub mod password;
