//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::prelude::FromRow;

use ridepool_core::{Phone, UserId};

use super::RepositoryError;
use crate::models::User;

/// Raw `users` row, converted to [`User`] at the query boundary.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i32,
    phone: Option<String>,
    email: String,
    name: Option<String>,
    image: Option<String>,
    verified: bool,
    rating: f64,
    total_rides: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let phone = row
            .phone
            .map(|p| {
                Phone::parse(&p).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            id: UserId::new(row.id),
            phone,
            email: row.email,
            name: row.name,
            image: row.image,
            verified: row.verified,
            rating: row.rating,
            total_rides: row.total_rides,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, phone, email, name, image, verified, rating, total_rides, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their phone number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored phone is invalid.
    pub async fn get_by_phone(&self, phone: &Phone) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone = $1"
        ))
        .bind(phone.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a new verified user from a phone number.
    ///
    /// The email is synthesized from the phone digits since the column is
    /// NOT NULL UNIQUE but phone-first accounts have no real address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone or email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_from_phone(&self, phone: &Phone) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (phone, email, verified)
             VALUES ($1, $2, TRUE)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(phone.as_str())
        .bind(phone.placeholder_email())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("phone already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        User::try_from(row)
    }

    /// Mark a user's phone as verified.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn mark_verified(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET verified = TRUE, updated_at = now() WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
