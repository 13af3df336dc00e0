//! Core business logic for Tanzia.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `balance` - Share-proportional balances of co-owners
//! - `security` - Login rate limiting, CSRF tokens and their sweepers
//! - `auth` - Password hashing and strength rules
//! - `tier` - Free tier record caps
//! - `billing` - Subscription webhook verification and events
//! - `report` - PDF report export

pub mod auth;
pub mod balance;
pub mod billing;
pub mod report;
pub mod security;
pub mod tier;
