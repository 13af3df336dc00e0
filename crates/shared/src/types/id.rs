//! Typed row identifiers.
//!
//! Rows get their UUIDs from the database layer; these wrappers only keep a
//! person id from being handed to a bill lookup, and serialize as the bare
//! UUID.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wraps a row UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the row UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

typed_id!(UserId, "Account owning every other record.");
typed_id!(SessionId, "Row of the `sessions` table behind a session cookie.");
typed_id!(PersonId, "Co-owner.");
typed_id!(BillId, "Shared expense.");
typed_id!(ProvisionId, "Advance payment.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
