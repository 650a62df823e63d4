use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Lifecycle state of a one-time code.
///
/// Both `Verified` and `Expired` are terminal: the code is spent either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
pub enum OtpStatus {
    Issued,
    Verified,
    Expired,
}

/// A single issued code. The otps table is append-only: rows are never
/// deleted, superseded codes simply stop being the most recent row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OtpRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub status: OtpStatus,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl OtpRecord {
    /// Most recently issued record for a user, regardless of status.
    ///
    /// Only this record is ever eligible for verification; older rows are
    /// implicitly invalidated by being superseded.
    pub async fn latest_for_user(user_id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM otps WHERE user_id = $1 ORDER BY issued_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a new issued record unless one newer than `cutoff` already
    /// exists for the user.
    ///
    /// The existence check and the insert run as one statement, so two
    /// racing issuance requests cannot both land inside the cooldown
    /// window. Returns None when the insert was suppressed.
    pub async fn insert_if_none_since(
        user_id: Uuid,
        code: &str,
        issued_at: DateTime<Utc>,
        cutoff: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO otps (user_id, code, issued_at, status)
             SELECT $1, $2, $3, 'issued'
             WHERE NOT EXISTS (
                 SELECT 1 FROM otps WHERE user_id = $1 AND issued_at > $4
             )
             RETURNING *",
        )
        .bind(user_id)
        .bind(code)
        .bind(issued_at)
        .bind(cutoff)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Move a record to a new lifecycle state
    pub async fn set_status(id: Uuid, status: OtpStatus, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE otps SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Number of records ever issued for a user
    pub async fn count_for_user(user_id: Uuid, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM otps WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }
}
