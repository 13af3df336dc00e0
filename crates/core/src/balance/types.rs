//! Balance input records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A co-owner and their weighted stake in shared costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Display name.
    pub name: String,
    /// Share ("tantieme"). Positive.
    pub share: u32,
}

impl Person {
    /// Creates a new person.
    #[must_use]
    pub fn new(name: impl Into<String>, share: u32) -> Self {
        Self {
            name: name.into(),
            share,
        }
    }
}

/// A shared expense divided among persons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Label shown on the dashboard and report.
    pub label: String,
    /// Amount. Non-negative.
    pub amount: Decimal,
}

impl Bill {
    /// Creates a new bill.
    #[must_use]
    pub fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// An advance payment credited back to persons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provision {
    /// Label shown on the dashboard and report.
    pub label: String,
    /// Amount. Non-negative.
    pub amount: Decimal,
}

impl Provision {
    /// Creates a new provision.
    #[must_use]
    pub fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}
