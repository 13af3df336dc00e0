//! Shared types, errors, and configuration for Tanzia.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Request/response payloads for the account and record endpoints
//! - Application-wide error types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod records;
pub mod types;

#[cfg(test)]
mod auth_tests;

pub use config::{
    AppConfig, DatabaseConfig, SecurityConfig, ServerConfig, SessionConfig, StripeConfig,
    TierConfig,
};
pub use error::{AppError, AppResult};
