//! `SeaORM` entities.

pub mod bills;
pub mod persons;
pub mod provisions;
pub mod sessions;
pub mod users;
