//! `Stripe-Signature` verification.
//!
//! The header looks like `t=1700000000,v1=5257a8...,v1=...`. The signed
//! content is `"{t}.{payload}"`, authenticated with HMAC-SHA256 keyed by the
//! endpoint secret and hex encoded.

use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::WebhookError;
use crate::security::constant_time_eq;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Accepted skew between the signed timestamp and now.
pub const DEFAULT_TOLERANCE: TimeDelta = TimeDelta::seconds(300);

struct SignatureHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_header(header: &str) -> Result<SignatureHeader<'_>, WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(SignatureHeader {
            timestamp,
            signatures,
        }),
        _ => Err(WebhookError::MalformedHeader),
    }
}

/// Computes the hex `v1` signature of `payload` signed at `timestamp`.
#[must_use]
pub fn compute_signature(payload: &[u8], timestamp: i64, secret: &str) -> String {
    // HMAC accepts keys of any length
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("{:x}", mac.finalize().into_bytes())
}

/// Checks `header` against `payload`.
///
/// # Errors
///
/// - [`WebhookError::MalformedHeader`] without a timestamp or `v1` entry
/// - [`WebhookError::TimestampOutOfTolerance`] if the timestamp is too far from `now`
/// - [`WebhookError::SignatureMismatch`] if no `v1` entry matches
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: TimeDelta,
    now: DateTime<Utc>,
) -> Result<(), WebhookError> {
    let header = parse_header(header)?;

    let skew = now.timestamp().abs_diff(header.timestamp);
    if skew > tolerance.num_seconds().unsigned_abs() {
        return Err(WebhookError::TimestampOutOfTolerance);
    }

    let expected = compute_signature(payload, header.timestamp, secret);
    if header
        .signatures
        .iter()
        .any(|candidate| constant_time_eq(expected.as_bytes(), candidate.as_bytes()))
    {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"invoice.paid","data":{"object":{}}}"#;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn signed_header(timestamp: i64) -> String {
        format!(
            "t={timestamp},v1={}",
            compute_signature(PAYLOAD, timestamp, SECRET)
        )
    }

    #[test]
    fn test_valid_signature() {
        let header = signed_header(now().timestamp());

        assert_eq!(
            verify_signature(PAYLOAD, &header, SECRET, DEFAULT_TOLERANCE, now()),
            Ok(())
        );
    }

    #[test]
    fn test_signature_is_lowercase_hex() {
        let signature = compute_signature(PAYLOAD, 1, SECRET);

        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn test_any_matching_v1_is_accepted() {
        let ts = now().timestamp();
        let header = format!(
            "t={ts},v1=deadbeef,v0=ignored,v1={}",
            compute_signature(PAYLOAD, ts, SECRET)
        );

        assert!(verify_signature(PAYLOAD, &header, SECRET, DEFAULT_TOLERANCE, now()).is_ok());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let header = signed_header(now().timestamp());

        assert_eq!(
            verify_signature(PAYLOAD, &header, "whsec_other", DEFAULT_TOLERANCE, now()),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let header = signed_header(now().timestamp());

        assert_eq!(
            verify_signature(b"{}", &header, SECRET, DEFAULT_TOLERANCE, now()),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let header = signed_header(now().timestamp() - 301);

        assert_eq!(
            verify_signature(PAYLOAD, &header, SECRET, DEFAULT_TOLERANCE, now()),
            Err(WebhookError::TimestampOutOfTolerance)
        );
    }

    #[test]
    fn test_timestamp_at_tolerance_is_accepted() {
        let header = signed_header(now().timestamp() - 300);

        assert!(verify_signature(PAYLOAD, &header, SECRET, DEFAULT_TOLERANCE, now()).is_ok());
    }

    #[test]
    fn test_malformed_headers() {
        for header in ["", "t=abc,v1=00", "v1=00", "t=1700000000", "garbage"] {
            assert_eq!(
                verify_signature(PAYLOAD, header, SECRET, DEFAULT_TOLERANCE, now()),
                Err(WebhookError::MalformedHeader),
                "header {header:?}"
            );
        }
    }
}
