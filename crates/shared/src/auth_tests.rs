use serde_json::json;
use validator::Validate;

use crate::auth::{LoginRequest, SignupRequest};

fn signup(email: &str, name: &str) -> SignupRequest {
    serde_json::from_value(json!({
        "email": email,
        "name": name,
        "password": "Sup3rSecret"
    }))
    .unwrap()
}

#[test]
fn signup_accepts_well_formed_payload() {
    assert!(signup("owner@example.com", "Claire").validate().is_ok());
}

#[test]
fn signup_rejects_bad_email() {
    let errors = signup("not-an-email", "Claire").validate().unwrap_err();
    assert!(errors.field_errors().contains_key("email"));
}

#[test]
fn signup_rejects_empty_name() {
    let errors = signup("owner@example.com", "").validate().unwrap_err();
    assert!(errors.field_errors().contains_key("name"));
}

#[test]
fn login_throttle_key_is_case_insensitive() {
    let a = LoginRequest {
        email: " Owner@Example.com ".to_string(),
        password: String::new(),
    };
    let b = LoginRequest {
        email: "owner@example.com".to_string(),
        password: String::new(),
    };
    assert_eq!(a.throttle_key(), b.throttle_key());
}
