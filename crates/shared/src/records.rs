//! Response payloads for the record endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{BillId, PersonId, ProvisionId};

/// A co-owner as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonResponse {
    /// Person ID.
    pub id: PersonId,
    /// Display name.
    pub name: String,
    /// Ownership share.
    pub share: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A shared expense as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillResponse {
    /// Bill ID.
    pub id: BillId,
    /// What was paid for.
    pub label: String,
    /// Amount in euros.
    pub amount: Decimal,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// An advance payment as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionResponse {
    /// Provision ID.
    pub id: ProvisionId,
    /// Period or purpose.
    pub label: String,
    /// Amount in euros.
    pub amount: Decimal,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
