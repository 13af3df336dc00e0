//! Account credentials.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - Password strength rules applied at signup

mod password;

pub use password::{
    MIN_PASSWORD_LENGTH, PasswordError, hash_password, validate_password_strength, verify_password,
};
