use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// User row - SQL persistence layer
///
/// The password hash stays inside this type; anything serialized outward
/// goes through [`PublicUser`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub phone: String,
    pub password_hash: String,
    pub name: String,
    pub user_type: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub street: Option<String>,
    pub is_verified: bool,
    /// Ids of users that have blocked this user; consumed by view predicates.
    pub blocked_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection of a user safe to return from the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub phone: String,
    pub name: String,
    #[serde(rename = "type")]
    pub user_type: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub street: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            phone: user.phone,
            name: user.name,
            user_type: user.user_type,
            latitude: user.latitude,
            longitude: user.longitude,
            street: user.street,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

/// Fields supplied at signup. Everything else takes its column default.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub phone: String,
    pub password_hash: String,
    pub name: String,
    pub user_type: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl NewUser {
    /// Insert a new unverified user
    pub async fn insert(&self, pool: &PgPool) -> Result<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (phone, password_hash, name, user_type, latitude, longitude)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(&self.phone)
        .bind(&self.password_hash)
        .bind(&self.name)
        .bind(self.user_type)
        .bind(self.latitude)
        .bind(self.longitude)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}

impl User {
    /// Find user by ID
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find user by unique phone number
    pub async fn find_by_phone(phone: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE phone = $1")
            .bind(phone)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Mark the user's phone number as verified
    pub async fn set_verified(id: Uuid, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE users SET is_verified = true, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Replace the stored password hash
    pub async fn update_password(id: Uuid, password_hash: &str, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Update geo-coordinates and street
    pub async fn update_location(
        id: Uuid,
        latitude: f64,
        longitude: f64,
        street: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE users
             SET latitude = $2, longitude = $3, street = $4, updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(latitude)
        .bind(longitude)
        .bind(street)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Replace the block list (who has blocked this user)
    pub async fn set_blocked_by(id: Uuid, blocked_by: &[Uuid], pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE users SET blocked_by = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(blocked_by)
            .execute(pool)
            .await?;
        Ok(())
    }
}
