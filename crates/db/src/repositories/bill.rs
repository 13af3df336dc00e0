//! Bill repository for database operations.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tanzia_shared::{records::BillResponse, types::BillId};
use uuid::Uuid;

use crate::entities::bills;

impl From<bills::Model> for BillResponse {
    fn from(model: bills::Model) -> Self {
        Self {
            id: BillId::from_uuid(model.id),
            label: model.label,
            amount: model.amount,
            created_at: model.created_at.into(),
        }
    }
}

/// Bill repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    db: DatabaseConnection,
}

impl BillRepository {
    /// Creates a new bill repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a shared expense for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        user_id: Uuid,
        label: &str,
        amount: Decimal,
    ) -> Result<bills::Model, DbErr> {
        Self::create_in(&self.db, user_id, label, amount).await
    }

    /// Records a shared expense through `conn`, which may be an open transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_in<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        label: &str,
        amount: Decimal,
    ) -> Result<bills::Model, DbErr> {
        bills::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            label: Set(label.to_string()),
            amount: Set(amount),
            created_at: Set(Utc::now().into()),
        }
        .insert(conn)
        .await
    }

    /// Lists the bills of `user_id` in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<bills::Model>, DbErr> {
        bills::Entity::find()
            .filter(bills::Column::UserId.eq(user_id))
            .order_by_asc(bills::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Counts the bills of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_by_user(&self, user_id: Uuid) -> Result<u64, DbErr> {
        Self::count_in(&self.db, user_id).await
    }

    /// Counts the bills of `user_id` through `conn`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_in<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<u64, DbErr> {
        bills::Entity::find()
            .filter(bills::Column::UserId.eq(user_id))
            .count(conn)
            .await
    }
}
