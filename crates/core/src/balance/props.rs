//! Property-based tests for the balance calculator.
//!
//! - Proportionality: a person's due is `share / total × amount`
//! - Partition: dues over persons whose shares sum to the total rebuild the bill
//! - Linearity: scaling every amount scales the net balance

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::{due_for_bill, net_balance};
use super::types::{Bill, Person, Provision};

/// Strategy to generate amounts (0.00 to 1,000,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive shares.
fn share() -> impl Strategy<Value = u32> {
    1u32..10_000
}

fn bills() -> impl Strategy<Value = Vec<Bill>> {
    prop::collection::vec(amount(), 0..8).prop_map(|amounts| {
        amounts
            .into_iter()
            .enumerate()
            .map(|(i, a)| Bill::new(format!("bill-{i}"), a))
            .collect()
    })
}

fn provisions() -> impl Strategy<Value = Vec<Provision>> {
    prop::collection::vec(amount(), 0..8).prop_map(|amounts| {
        amounts
            .into_iter()
            .enumerate()
            .map(|(i, a)| Provision::new(format!("provision-{i}"), a))
            .collect()
    })
}

/// Tolerance for inexact decimal quotients.
fn tolerance() -> Decimal {
    Decimal::new(1, 12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A due is the share's fraction of the bill.
    #[test]
    fn prop_due_is_proportional(
        s in share(),
        extra in 0u32..10_000,
        a in amount(),
    ) {
        let total = u64::from(s) + u64::from(extra);
        let person = Person::new("p", s);
        let bill = Bill::new("b", a);

        let due = due_for_bill(&person, total, &bill);
        let expected = a * Decimal::from(s) / Decimal::from(total);
        prop_assert!((due - expected).abs() <= tolerance());
        prop_assert!(due <= a);
    }

    /// Dues over a partition of the total reconstruct the bill.
    #[test]
    fn prop_partition_reconstructs_bill(
        shares in prop::collection::vec(share(), 1..12),
        a in amount(),
    ) {
        let total: u64 = shares.iter().map(|s| u64::from(*s)).sum();
        let bill = Bill::new("b", a);

        let sum: Decimal = shares
            .iter()
            .map(|s| due_for_bill(&Person::new("p", *s), total, &bill))
            .sum();
        prop_assert!((sum - a).abs() <= tolerance());
    }

    /// Doubling every bill and provision doubles the net balance.
    #[test]
    fn prop_net_balance_is_linear(
        s in share(),
        extra in 0u32..10_000,
        bills in bills(),
        provisions in provisions(),
    ) {
        let total = u64::from(s) + u64::from(extra);
        let person = Person::new("p", s);
        let two = Decimal::TWO;

        let doubled_bills: Vec<Bill> = bills
            .iter()
            .map(|b| Bill::new(b.label.clone(), b.amount * two))
            .collect();
        let doubled_provisions: Vec<Provision> = provisions
            .iter()
            .map(|p| Provision::new(p.label.clone(), p.amount * two))
            .collect();

        let base = net_balance(&person, total, &bills, &provisions);
        let doubled = net_balance(&person, total, &doubled_bills, &doubled_provisions);
        prop_assert!((doubled - base * two).abs() <= tolerance());
    }
}
