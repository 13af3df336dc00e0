//! Webhook event decoding.

use serde::Deserialize;

use super::error::WebhookError;

/// Subscription lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and running.
    Active,
    /// In a free trial.
    Trialing,
    /// Payment failed, retrying.
    PastDue,
    /// Ended.
    Canceled,
    /// Awaiting the first payment.
    Incomplete,
    /// First payment never completed.
    IncompleteExpired,
    /// Retries exhausted.
    Unpaid,
    /// Collection paused.
    Paused,
    /// A status this application does not know about.
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    /// Returns true if this status grants premium access.
    #[must_use]
    pub const fn grants_premium(&self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }
}

/// Events that change an account's premium flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// A checkout finished: link the customer to the account with this email.
    CheckoutCompleted {
        /// Billing customer id.
        customer_id: String,
        /// Email entered at checkout.
        customer_email: String,
    },
    /// A subscription was created, updated or resumed.
    SubscriptionChanged {
        /// Billing customer id.
        customer_id: String,
        /// New status.
        status: SubscriptionStatus,
    },
    /// A subscription ended.
    SubscriptionDeleted {
        /// Billing customer id.
        customer_id: String,
    },
    /// Any other event type.
    Ignored {
        /// Event type.
        event_type: String,
    },
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawData,
}

#[derive(Deserialize)]
struct RawData {
    object: serde_json::Value,
}

/// Customer reference: a bare id or an expanded object.
#[derive(Deserialize)]
#[serde(untagged)]
enum CustomerRef {
    Id(String),
    Object { id: String },
}

impl CustomerRef {
    fn into_id(self) -> String {
        match self {
            Self::Id(id) | Self::Object { id } => id,
        }
    }
}

#[derive(Deserialize)]
struct CheckoutSession {
    customer: Option<CustomerRef>,
    customer_details: Option<CustomerDetails>,
}

#[derive(Deserialize)]
struct CustomerDetails {
    email: Option<String>,
}

#[derive(Deserialize)]
struct Subscription {
    customer: Option<CustomerRef>,
    status: Option<SubscriptionStatus>,
}

fn decode<T: for<'de> Deserialize<'de>>(object: serde_json::Value) -> Result<T, WebhookError> {
    serde_json::from_value(object).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
}

fn missing(event_type: &str, field: &'static str) -> WebhookError {
    WebhookError::MissingField {
        event_type: event_type.to_string(),
        field,
    }
}

/// Decodes a verified webhook payload.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidPayload`] for malformed JSON and
/// [`WebhookError::MissingField`] when a handled event lacks its customer
/// data.
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, WebhookError> {
    let raw: RawEvent =
        serde_json::from_slice(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
    let event_type = raw.event_type.as_str();

    match event_type {
        "checkout.session.completed" => {
            let session: CheckoutSession = decode(raw.data.object)?;
            let customer_id = session
                .customer
                .map(CustomerRef::into_id)
                .ok_or_else(|| missing(event_type, "customer"))?;
            let customer_email = session
                .customer_details
                .and_then(|details| details.email)
                .ok_or_else(|| missing(event_type, "customer_details.email"))?;
            Ok(WebhookEvent::CheckoutCompleted {
                customer_id,
                customer_email,
            })
        }
        "customer.subscription.created"
        | "customer.subscription.updated"
        | "customer.subscription.resumed" => {
            let subscription: Subscription = decode(raw.data.object)?;
            let customer_id = subscription
                .customer
                .map(CustomerRef::into_id)
                .ok_or_else(|| missing(event_type, "customer"))?;
            let status = subscription
                .status
                .ok_or_else(|| missing(event_type, "status"))?;
            Ok(WebhookEvent::SubscriptionChanged {
                customer_id,
                status,
            })
        }
        "customer.subscription.deleted" => {
            let subscription: Subscription = decode(raw.data.object)?;
            let customer_id = subscription
                .customer
                .map(CustomerRef::into_id)
                .ok_or_else(|| missing(event_type, "customer"))?;
            Ok(WebhookEvent::SubscriptionDeleted { customer_id })
        }
        _ => Ok(WebhookEvent::Ignored {
            event_type: raw.event_type,
        }),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn payload(event_type: &str, object: &serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_1",
            "object": "event",
            "type": event_type,
            "data": { "object": object },
        }))
        .unwrap()
    }

    #[test]
    fn test_checkout_completed() {
        let body = payload(
            "checkout.session.completed",
            &json!({
                "id": "cs_1",
                "customer": "cus_123",
                "customer_details": { "email": "owner@example.com", "name": "Owner" },
            }),
        );

        assert_eq!(
            parse_event(&body).unwrap(),
            WebhookEvent::CheckoutCompleted {
                customer_id: "cus_123".into(),
                customer_email: "owner@example.com".into(),
            }
        );
    }

    #[test]
    fn test_checkout_with_expanded_customer() {
        let body = payload(
            "checkout.session.completed",
            &json!({
                "customer": { "id": "cus_123", "object": "customer" },
                "customer_details": { "email": "owner@example.com" },
            }),
        );

        assert!(matches!(
            parse_event(&body).unwrap(),
            WebhookEvent::CheckoutCompleted { customer_id, .. } if customer_id == "cus_123"
        ));
    }

    #[test]
    fn test_checkout_without_customer_is_an_error() {
        let body = payload(
            "checkout.session.completed",
            &json!({ "customer": null, "customer_details": { "email": "a@b.c" } }),
        );

        assert!(matches!(
            parse_event(&body),
            Err(WebhookError::MissingField { field: "customer", .. })
        ));
    }

    #[rstest]
    #[case("customer.subscription.created", "active", true)]
    #[case("customer.subscription.updated", "trialing", true)]
    #[case("customer.subscription.resumed", "active", true)]
    #[case("customer.subscription.updated", "past_due", false)]
    #[case("customer.subscription.updated", "canceled", false)]
    #[case("customer.subscription.updated", "some_future_status", false)]
    fn test_subscription_changes(
        #[case] event_type: &str,
        #[case] status: &str,
        #[case] premium: bool,
    ) {
        let body = payload(event_type, &json!({ "customer": "cus_9", "status": status }));

        let WebhookEvent::SubscriptionChanged {
            customer_id,
            status,
        } = parse_event(&body).unwrap()
        else {
            panic!("expected a subscription change");
        };
        assert_eq!(customer_id, "cus_9");
        assert_eq!(status.grants_premium(), premium);
    }

    #[test]
    fn test_subscription_deleted() {
        let body = payload(
            "customer.subscription.deleted",
            &json!({ "customer": "cus_9", "status": "canceled" }),
        );

        assert_eq!(
            parse_event(&body).unwrap(),
            WebhookEvent::SubscriptionDeleted {
                customer_id: "cus_9".into()
            }
        );
    }

    #[test]
    fn test_unhandled_event_is_ignored() {
        let body = payload("invoice.paid", &json!({ "id": "in_1" }));

        assert_eq!(
            parse_event(&body).unwrap(),
            WebhookEvent::Ignored {
                event_type: "invoice.paid".into()
            }
        );
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(
            parse_event(b"not json"),
            Err(WebhookError::InvalidPayload(_))
        ));
    }
}
