//! Subscription billing webhooks.
//!
//! - `signature` - `Stripe-Signature` header parsing and HMAC verification
//! - `event` - the subset of webhook events that toggle premium access

mod error;
pub mod event;
pub mod signature;

pub use error::WebhookError;
pub use event::{SubscriptionStatus, WebhookEvent, parse_event};
pub use signature::{DEFAULT_TOLERANCE, SIGNATURE_HEADER, verify_signature};

use chrono::{DateTime, TimeDelta, Utc};

/// Verifies `payload` against `header` and decodes it.
///
/// # Errors
///
/// Returns a [`WebhookError`] if the signature is rejected or the payload
/// is not a well-formed event.
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: TimeDelta,
    now: DateTime<Utc>,
) -> Result<WebhookEvent, WebhookError> {
    verify_signature(payload, header, secret, tolerance, now)?;
    parse_event(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_event_verifies_then_parses() {
        let payload = br#"{"type":"customer.subscription.deleted","data":{"object":{"customer":"cus_1"}}}"#;
        let now = Utc::now();
        let header = format!(
            "t={},v1={}",
            now.timestamp(),
            signature::compute_signature(payload, now.timestamp(), "whsec")
        );

        let event = construct_event(payload, &header, "whsec", DEFAULT_TOLERANCE, now).unwrap();
        assert_eq!(
            event,
            WebhookEvent::SubscriptionDeleted {
                customer_id: "cus_1".into()
            }
        );

        assert_eq!(
            construct_event(payload, &header, "other", DEFAULT_TOLERANCE, now),
            Err(WebhookError::SignatureMismatch)
        );
    }
}
