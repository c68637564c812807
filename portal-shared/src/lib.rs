//! # Portal Shared Library
//!
//! Shared types and business logic for the campus portal: database models,
//! authentication primitives, and database utilities, consumed by the
//! `portal-api` HTTP boundary.
//!
//! ## Module Organization
//!
//! - `models`: database models and store operations
//! - `auth`: credential hashing, sessions, and the authorization gate
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the portal shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
