//! Free and premium tier record caps.

use serde::{Deserialize, Serialize};
use tanzia_shared::TierConfig;

/// Record kinds capped on the free tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Co-owners.
    Persons,
    /// Shared expenses.
    Bills,
    /// Advance payments.
    Provisions,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persons => write!(f, "persons"),
            Self::Bills => write!(f, "bills"),
            Self::Provisions => write!(f, "provisions"),
        }
    }
}

/// Result of a limit check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitCheck {
    /// Whether one more record may be created.
    pub allowed: bool,
    /// Records already owned.
    pub current: u64,
    /// Cap for the account's tier (None = unlimited).
    pub limit: Option<u64>,
    /// Human-readable message if the cap is reached.
    pub message: Option<String>,
}

/// Per-resource caps for free accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimits {
    /// Maximum persons.
    pub persons: u64,
    /// Maximum bills.
    pub bills: u64,
    /// Maximum provisions.
    pub provisions: u64,
}

impl Default for TierLimits {
    fn default() -> Self {
        Self::from(&TierConfig::default())
    }
}

impl From<&TierConfig> for TierLimits {
    fn from(config: &TierConfig) -> Self {
        Self {
            persons: config.free_person_limit,
            bills: config.free_bill_limit,
            provisions: config.free_provision_limit,
        }
    }
}

impl TierLimits {
    /// Free tier cap for `resource`.
    #[must_use]
    pub const fn free_limit(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Persons => self.persons,
            Resource::Bills => self.bills,
            Resource::Provisions => self.provisions,
        }
    }

    /// Checks whether an account owning `current` records of `resource`
    /// may create one more.
    #[must_use]
    pub fn check(&self, resource: Resource, current: u64, is_premium: bool) -> LimitCheck {
        // None means unlimited
        let limit = (!is_premium).then(|| self.free_limit(resource));
        let allowed = limit.is_none_or(|max| current < max);

        let message = if allowed {
            None
        } else {
            Some(format!(
                "Free plan limit reached: {current}/{} {resource}. Upgrade to premium for unlimited records.",
                limit.unwrap_or(0),
            ))
        };

        LimitCheck {
            allowed,
            current,
            limit,
            message,
        }
    }
}
