//! Integration tests for the record repositories and ledger loading.

mod common;

use rust_decimal_macros::dec;
use sea_orm::TransactionTrait;
use tanzia_db::{BillRepository, LedgerRepository, PersonRepository, ProvisionRepository};

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_records_are_counted_per_user() {
    let db = common::setup().await;
    let owner = common::create_test_user(&db).await;
    let other = common::create_test_user(&db).await;
    let persons = PersonRepository::new(db.clone());

    persons.create(owner.id, "Alice", 5).await.unwrap();
    persons.create(owner.id, "Bob", 5).await.unwrap();
    persons.create(other.id, "Carol", 1).await.unwrap();

    assert_eq!(persons.count_by_user(owner.id).await.unwrap(), 2);
    assert_eq!(persons.count_by_user(other.id).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_ledger_load_computes_balances() {
    let db = common::setup().await;
    let owner = common::create_test_user(&db).await;

    let persons = PersonRepository::new(db.clone());
    persons.create(owner.id, "Alice", 5).await.unwrap();
    persons.create(owner.id, "Bob", 5).await.unwrap();

    let bills = BillRepository::new(db.clone());
    bills.create(owner.id, "Travaux 1", dec!(1800)).await.unwrap();
    bills.create(owner.id, "Travaux 2", dec!(2600)).await.unwrap();

    let provisions = ProvisionRepository::new(db.clone());
    provisions.create(owner.id, "T1", dec!(2000)).await.unwrap();
    provisions.create(owner.id, "T2", dec!(2200)).await.unwrap();

    let ledger = LedgerRepository::new(db.clone()).load(owner.id).await.unwrap();

    assert_eq!(ledger.persons.len(), 2);
    assert_eq!(ledger.bills[0].label, "Travaux 1");
    let balances = ledger.balances();
    assert_eq!(balances[0].net, dec!(-100));
    assert_eq!(balances[1].net, dec!(-100));
    assert_eq!(ledger.global_balance(), dec!(-200));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_rolled_back_create_leaves_no_record() {
    let db = common::setup().await;
    let owner = common::create_test_user(&db).await;

    let txn = db.begin().await.unwrap();
    PersonRepository::create_in(&txn, owner.id, "Alice", 5).await.unwrap();
    assert_eq!(PersonRepository::count_in(&txn, owner.id).await.unwrap(), 1);
    txn.rollback().await.unwrap();

    let persons = PersonRepository::new(db.clone());
    assert_eq!(persons.count_by_user(owner.id).await.unwrap(), 0);
}
