//! Test fixtures and direct-store helpers.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use server_core::domains::auth::password::hash_password;
use server_core::domains::authz::models::Role;
use server_core::domains::users::{NewUser, User};

/// A phone number unlikely to collide across tests sharing one database.
pub fn unique_phone() -> String {
    let digits = Uuid::new_v4().as_u128() % 1_000_000_000;
    format!("+964{:09}", digits)
}

/// Create a user directly in the store.
pub async fn create_user(
    pool: &PgPool,
    phone: &str,
    password: &str,
    verified: bool,
) -> Result<User> {
    let user = NewUser {
        phone: phone.to_string(),
        password_hash: hash_password(password)?,
        name: "Test User".to_string(),
        user_type: 0,
        latitude: None,
        longitude: None,
    }
    .insert(pool)
    .await?;

    if verified {
        User::set_verified(user.id, pool).await?;
    }

    Ok(User::find_by_id(user.id, pool).await?.expect("user exists"))
}

/// Assign a seeded role to a user.
pub async fn assign_role(pool: &PgPool, user_id: Uuid, role_name: &str) -> Result<()> {
    let role = Role::find_by_name(role_name, pool)
        .await?
        .expect("role is seeded");
    Role::assign_to_user(role.id, user_id, pool).await
}

/// Rewind the newest OTP for a user by `seconds` so cooldown and expiry
/// windows can be crossed without waiting.
pub async fn age_latest_otp(pool: &PgPool, user_id: Uuid, seconds: i64) -> Result<()> {
    sqlx::query(
        "UPDATE otps
         SET issued_at = issued_at - ($2 * interval '1 second')
         WHERE id = (
             SELECT id FROM otps WHERE user_id = $1 ORDER BY issued_at DESC LIMIT 1
         )",
    )
    .bind(user_id)
    .bind(seconds as f64)
    .execute(pool)
    .await?;
    Ok(())
}
