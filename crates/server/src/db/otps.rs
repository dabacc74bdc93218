//! One-time code repository.
//!
//! Multiple rows may exist per phone (history); only unverified, unexpired
//! rows are eligible for sign-in matching, and issuance deletes prior
//! unverified rows so at most one code is live at a time.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::prelude::FromRow;

use ridepool_core::{OtpId, Phone};

use super::RepositoryError;
use crate::models::OneTimeCode;

/// Raw `otps` row.
#[derive(Debug, FromRow)]
struct OtpRow {
    id: i32,
    phone: String,
    code: String,
    verified: bool,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<OtpRow> for OneTimeCode {
    type Error = RepositoryError;

    fn try_from(row: OtpRow) -> Result<Self, Self::Error> {
        let phone = Phone::parse(&row.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;

        Ok(Self {
            id: OtpId::new(row.id),
            phone,
            code: row.code,
            verified: row.verified,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

const OTP_COLUMNS: &str = "id, phone, code, verified, created_at, expires_at";

/// Repository for one-time code operations.
pub struct OtpRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OtpRepository<'a> {
    /// Create a new OTP repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count codes issued for a phone since `cutoff`.
    ///
    /// The caller derives `cutoff` from the trailing rate-limit window, so
    /// this is a sliding window rather than a calendar bucket.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_since(
        &self,
        phone: &Phone,
        cutoff: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM otps WHERE phone = $1 AND created_at >= $2")
                .bind(phone.as_str())
                .bind(cutoff)
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }

    /// Delete all unverified codes for a phone (issuance cleanup).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_unverified(&self, phone: &Phone) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM otps WHERE phone = $1 AND verified = FALSE")
            .bind(phone.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Insert a freshly generated code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        phone: &Phone,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<OneTimeCode, RepositoryError> {
        let row: OtpRow = sqlx::query_as(&format!(
            "INSERT INTO otps (phone, code, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {OTP_COLUMNS}"
        ))
        .bind(phone.as_str())
        .bind(code)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        OneTimeCode::try_from(row)
    }

    /// Find the newest code matching (phone, code) with the given verified
    /// flag that has not expired. Newest-first ordering makes the latest code
    /// win if multiple rows incidentally match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_matching(
        &self,
        phone: &Phone,
        code: &str,
        verified: bool,
    ) -> Result<Option<OneTimeCode>, RepositoryError> {
        let row: Option<OtpRow> = sqlx::query_as(&format!(
            "SELECT {OTP_COLUMNS} FROM otps
             WHERE phone = $1 AND code = $2 AND verified = $3 AND expires_at >= now()
             ORDER BY created_at DESC
             LIMIT 1"
        ))
        .bind(phone.as_str())
        .bind(code)
        .bind(verified)
        .fetch_optional(self.pool)
        .await?;

        row.map(OneTimeCode::try_from).transpose()
    }

    /// Mark a code as verified (single-use consumption).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the code doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn mark_verified(&self, id: OtpId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE otps SET verified = TRUE WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete every code for a phone, verified or not (session issuance
    /// cleanup).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all(&self, phone: &Phone) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM otps WHERE phone = $1")
            .bind(phone.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
