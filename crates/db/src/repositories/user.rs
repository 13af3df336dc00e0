//! User repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, sea_query::Expr,
};
use uuid::Uuid;

use crate::entities::users;

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Reads a user with `SELECT ... FOR UPDATE` through `conn`.
    ///
    /// Inside a transaction, the row stays locked until commit or rollback,
    /// so concurrent writers to the same account are serialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn lock_in<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
    }

    /// Creates a new free-tier user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<users::Model, DbErr> {
        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            password_hash: Set(password_hash.to_string()),
            is_premium: Set(false),
            stripe_customer_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db).await
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Grants premium to the user registered with `email` and links the
    /// billing customer. Returns the number of users updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn activate_premium_by_email(
        &self,
        email: &str,
        customer_id: &str,
    ) -> Result<u64, DbErr> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::IsPremium, Expr::value(true))
            .col_expr(users::Column::StripeCustomerId, Expr::value(customer_id))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Email.eq(email))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Sets the premium flag of the user linked to `customer_id`.
    /// Returns the number of users updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_premium_by_customer(
        &self,
        customer_id: &str,
        is_premium: bool,
    ) -> Result<u64, DbErr> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::IsPremium, Expr::value(is_premium))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::StripeCustomerId.eq(customer_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
