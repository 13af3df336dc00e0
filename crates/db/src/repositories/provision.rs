//! Provision repository for database operations.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tanzia_shared::{records::ProvisionResponse, types::ProvisionId};
use uuid::Uuid;

use crate::entities::provisions;

impl From<provisions::Model> for ProvisionResponse {
    fn from(model: provisions::Model) -> Self {
        Self {
            id: ProvisionId::from_uuid(model.id),
            label: model.label,
            amount: model.amount,
            created_at: model.created_at.into(),
        }
    }
}

/// Provision repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ProvisionRepository {
    db: DatabaseConnection,
}

impl ProvisionRepository {
    /// Creates a new provision repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a advance payment for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        user_id: Uuid,
        label: &str,
        amount: Decimal,
    ) -> Result<provisions::Model, DbErr> {
        Self::create_in(&self.db, user_id, label, amount).await
    }

    /// Records a advance payment through `conn`, which may be an open transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_in<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        label: &str,
        amount: Decimal,
    ) -> Result<provisions::Model, DbErr> {
        provisions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            label: Set(label.to_string()),
            amount: Set(amount),
            created_at: Set(Utc::now().into()),
        }
        .insert(conn)
        .await
    }

    /// Lists the provisions of `user_id` in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<provisions::Model>, DbErr> {
        provisions::Entity::find()
            .filter(provisions::Column::UserId.eq(user_id))
            .order_by_asc(provisions::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Counts the provisions of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_by_user(&self, user_id: Uuid) -> Result<u64, DbErr> {
        Self::count_in(&self.db, user_id).await
    }

    /// Counts the provisions of `user_id` through `conn`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_in<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<u64, DbErr> {
        provisions::Entity::find()
            .filter(provisions::Column::UserId.eq(user_id))
            .count(conn)
            .await
    }
}
