//! Loads an account's records as a balance ledger.

use sea_orm::{DatabaseConnection, DbErr};
use tanzia_core::balance::{Bill, Ledger, Person, Provision};
use uuid::Uuid;

use super::{BillRepository, PersonRepository, ProvisionRepository};
use crate::entities::{bills, persons, provisions};

/// Read-only view assembling a [`Ledger`] from the three record tables.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    persons: PersonRepository,
    bills: BillRepository,
    provisions: ProvisionRepository,
}

impl From<persons::Model> for Person {
    fn from(model: persons::Model) -> Self {
        // the table rejects non-positive shares
        Self::new(model.name, u32::try_from(model.share).unwrap_or_default())
    }
}

impl From<bills::Model> for Bill {
    fn from(model: bills::Model) -> Self {
        Self::new(model.label, model.amount)
    }
}

impl From<provisions::Model> for Provision {
    fn from(model: provisions::Model) -> Self {
        Self::new(model.label, model.amount)
    }
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            persons: PersonRepository::new(db.clone()),
            bills: BillRepository::new(db.clone()),
            provisions: ProvisionRepository::new(db),
        }
    }

    /// Loads every record of `user_id`, each list in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the queries fails.
    pub async fn load(&self, user_id: Uuid) -> Result<Ledger, DbErr> {
        let (persons, bills, provisions) = tokio::try_join!(
            self.persons.list_by_user(user_id),
            self.bills.list_by_user(user_id),
            self.provisions.list_by_user(user_id),
        )?;

        Ok(Ledger::new(
            persons.into_iter().map(Person::from).collect(),
            bills.into_iter().map(Bill::from).collect(),
            provisions.into_iter().map(Provision::from).collect(),
        ))
    }
}
