//! # Taskboard Shared Library
//!
//! This crate contains the domain types, persistence, and the access-control
//! and task-ordering core used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `store`: The `ProjectStore` seam (PostgreSQL and in-memory implementations)
//! - `auth`: Token validation, request context, authorization, project resolution
//! - `collaborators`: Membership management rules
//! - `board`: Task ordering engine and board columns
//! - `db`: Connection pool and migrations
//! - `error`: Core error taxonomy

pub mod auth;
pub mod board;
pub mod collaborators;
pub mod db;
pub mod error;
pub mod models;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
