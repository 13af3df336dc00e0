//! A property's full set of persons, bills and provisions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculator::{credit_for_provision, due_for_bill};
use super::types::{Bill, Person, Provision};

/// Everything recorded for one account, as consumed by the dashboard
/// and the PDF report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// Co-owners.
    pub persons: Vec<Person>,
    /// Shared expenses.
    pub bills: Vec<Bill>,
    /// Advance payments.
    pub provisions: Vec<Provision>,
}

/// One person's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonBalance {
    /// Person name.
    pub name: String,
    /// Person share.
    pub share: u32,
    /// Share of the total, in percent.
    pub share_percent: Decimal,
    /// Total owed across all bills.
    pub owed: Decimal,
    /// Total credited across all provisions.
    pub credited: Decimal,
    /// `credited - owed`.
    pub net: Decimal,
}

impl Ledger {
    /// Creates a ledger from its parts.
    #[must_use]
    pub const fn new(persons: Vec<Person>, bills: Vec<Bill>, provisions: Vec<Provision>) -> Self {
        Self {
            persons,
            bills,
            provisions,
        }
    }

    /// Sum of every person's share.
    #[must_use]
    pub fn total_share(&self) -> u64 {
        self.persons.iter().map(|p| u64::from(p.share)).sum()
    }

    /// Sum of all bill amounts.
    #[must_use]
    pub fn total_bills(&self) -> Decimal {
        self.bills.iter().map(|b| b.amount).sum()
    }

    /// Sum of all provision amounts.
    #[must_use]
    pub fn total_provisions(&self) -> Decimal {
        self.provisions.iter().map(|p| p.amount).sum()
    }

    /// Property-wide balance: provisions collected minus bills incurred.
    #[must_use]
    pub fn global_balance(&self) -> Decimal {
        self.total_provisions() - self.total_bills()
    }

    /// Percentage of the total share held by `person`, or zero when the
    /// total share is zero.
    #[must_use]
    pub fn share_percent(&self, person: &Person) -> Decimal {
        (Decimal::from(person.share) * Decimal::ONE_HUNDRED)
            .checked_div(Decimal::from(self.total_share()))
            .unwrap_or(Decimal::ZERO)
    }

    /// Per-person balances in person order.
    ///
    /// Empty when the total share is zero: such a property has no
    /// computable balances.
    #[must_use]
    pub fn balances(&self) -> Vec<PersonBalance> {
        let total_share = self.total_share();
        if total_share == 0 {
            return Vec::new();
        }

        self.persons
            .iter()
            .map(|person| {
                let owed: Decimal = self
                    .bills
                    .iter()
                    .map(|bill| due_for_bill(person, total_share, bill))
                    .sum();
                let credited: Decimal = self
                    .provisions
                    .iter()
                    .map(|provision| credit_for_provision(person, total_share, provision))
                    .sum();

                PersonBalance {
                    name: person.name.clone(),
                    share: person.share,
                    share_percent: self.share_percent(person),
                    owed,
                    credited,
                    net: credited - owed,
                }
            })
            .collect()
    }
}
