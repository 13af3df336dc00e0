//! Proportional balance calculation for co-owners.
//!
//! Every bill is split across persons in proportion to their share
//! ("tantieme"), and every provision is credited back the same way. A
//! person's net balance is what they were credited minus what they owe.

pub mod calculator;
pub mod ledger;
pub mod types;

#[cfg(test)]
mod props;

pub use calculator::{credit_for_provision, due_for_bill, net_balance};
pub use ledger::{Ledger, PersonBalance};
pub use types::{Bill, Person, Provision};
