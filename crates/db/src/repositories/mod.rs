//! Repository implementations for data access.

mod bill;
mod ledger;
mod person;
mod provision;
mod session;
mod user;

pub use bill::BillRepository;
pub use ledger::LedgerRepository;
pub use person::PersonRepository;
pub use provision::ProvisionRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
