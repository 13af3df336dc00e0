//! Per-person dues and credits.
//!
//! All functions are pure. `total_share` is the sum of every person's
//! share in the property; callers must not pass zero (a property whose
//! persons hold no share has no computable balances). A zero total yields
//! zero.

use rust_decimal::Decimal;

use super::types::{Bill, Person, Provision};

/// Returns `amount × share / total_share`, or zero when `total_share` is zero.
fn proportional(amount: Decimal, share: u32, total_share: u64) -> Decimal {
    (amount * Decimal::from(share))
        .checked_div(Decimal::from(total_share))
        .unwrap_or(Decimal::ZERO)
}

/// Returns the part of `bill` owed by `person`.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tanzia_core::balance::{Bill, Person, due_for_bill};
///
/// let person = Person::new("John Doe", 2);
/// let bill = Bill::new("Electricity", dec!(1000));
/// assert_eq!(due_for_bill(&person, 5, &bill), dec!(400));
/// ```
#[must_use]
pub fn due_for_bill(person: &Person, total_share: u64, bill: &Bill) -> Decimal {
    proportional(bill.amount, person.share, total_share)
}

/// Returns the part of `provision` credited to `person`.
#[must_use]
pub fn credit_for_provision(person: &Person, total_share: u64, provision: &Provision) -> Decimal {
    proportional(provision.amount, person.share, total_share)
}

/// Returns what `person` was credited minus what they owe.
///
/// Dues and credits are summed in input order.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tanzia_core::balance::{Bill, Person, Provision, net_balance};
///
/// let person = Person::new("John Doe", 5);
/// let bills = [Bill::new("Works 1", dec!(1800)), Bill::new("Works 2", dec!(2600))];
/// let provisions = [
///     Provision::new("Q1", dec!(2000)),
///     Provision::new("Q2", dec!(2200)),
/// ];
/// assert_eq!(net_balance(&person, 10, &bills, &provisions), dec!(-100));
/// ```
#[must_use]
pub fn net_balance(
    person: &Person,
    total_share: u64,
    bills: &[Bill],
    provisions: &[Provision],
) -> Decimal {
    let owed: Decimal = bills
        .iter()
        .map(|bill| due_for_bill(person, total_share, bill))
        .sum();
    let credited: Decimal = provisions
        .iter()
        .map(|provision| credit_for_provision(person, total_share, provision))
        .sum();

    credited - owed
}
