//! Person repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tanzia_shared::{records::PersonResponse, types::PersonId};
use uuid::Uuid;

use crate::entities::persons;

impl From<persons::Model> for PersonResponse {
    fn from(model: persons::Model) -> Self {
        Self {
            id: PersonId::from_uuid(model.id),
            name: model.name,
            // the table rejects non-positive shares
            share: u32::try_from(model.share).unwrap_or_default(),
            created_at: model.created_at.into(),
        }
    }
}

/// Person repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct PersonRepository {
    db: DatabaseConnection,
}

impl PersonRepository {
    /// Creates a new person repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a co-owner for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `share` does not fit the column or the insert fails.
    pub async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        share: u32,
    ) -> Result<persons::Model, DbErr> {
        Self::create_in(&self.db, user_id, name, share).await
    }

    /// Records a co-owner through `conn`, which may be an open transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if `share` does not fit the column or the insert fails.
    pub async fn create_in<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        name: &str,
        share: u32,
    ) -> Result<persons::Model, DbErr> {
        let share = i32::try_from(share)
            .map_err(|_| DbErr::Custom(format!("share {share} out of range")))?;

        persons::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(name.to_string()),
            share: Set(share),
            created_at: Set(Utc::now().into()),
        }
        .insert(conn)
        .await
    }

    /// Lists the co-owners of `user_id` in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<persons::Model>, DbErr> {
        persons::Entity::find()
            .filter(persons::Column::UserId.eq(user_id))
            .order_by_asc(persons::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Counts the co-owners of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_by_user(&self, user_id: Uuid) -> Result<u64, DbErr> {
        Self::count_in(&self.db, user_id).await
    }

    /// Counts the co-owners of `user_id` through `conn`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_in<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<u64, DbErr> {
        persons::Entity::find()
            .filter(persons::Column::UserId.eq(user_id))
            .count(conn)
            .await
    }
}
