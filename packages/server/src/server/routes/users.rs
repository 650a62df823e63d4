//! Signup, login, profile, and password reset handlers.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::domains::auth::password::{hash_password, verify_password};
use crate::domains::authz::models::Role;
use crate::domains::users::{NewUser, PublicUser, User};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::CurrentUser;
use crate::server::routes::MessageResponse;

/// Session tokens live a year; clients re-login after that.
const SESSION_TOKEN_DAYS: i64 = 365;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 10, message = "phone must be at least 10 characters"))]
    pub phone: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub name: String,
    #[serde(rename = "type")]
    pub user_type: i32,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// Register a new (unverified) user and hand back a session token.
///
/// The new user gets the default `user` role.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.validate()?;

    if User::find_by_phone(&payload.phone, &state.db_pool)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Phone number already exists".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = NewUser {
        phone: payload.phone,
        password_hash,
        name: payload.name,
        user_type: payload.user_type,
        latitude: payload.latitude,
        longitude: payload.longitude,
    }
    .insert(&state.db_pool)
    .await?;

    if let Some(role) = Role::find_by_name("user", &state.db_pool).await? {
        Role::assign_to_user(role.id, user.id, &state.db_pool).await?;
    }

    let token = state.tokens.issue(
        user.id,
        user.phone.clone(),
        Duration::days(SESSION_TOKEN_DAYS),
    )?;
    info!(user_id = %user.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// Exchange phone + password for a session token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = User::find_by_phone(&payload.phone, &state.db_pool)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid_credentials());
    }

    let token = state.tokens.issue(
        user.id,
        user.phone.clone(),
        Duration::days(SESSION_TOKEN_DAYS),
    )?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

// Same message for unknown phone and wrong password.
fn invalid_credentials() -> ApiError {
    ApiError::Unauthenticated("Invalid phone number or password".to_string())
}

/// The authenticated user's own record
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<PublicUser> {
    Json(user.into())
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    pub street: String,
}

/// Update the authenticated user's coordinates and street
pub async fn update_location(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    payload.validate()?;

    let updated = User::update_location(
        user.id,
        payload.latitude,
        payload.longitude,
        &payload.street,
        &state.db_pool,
    )
    .await?;

    Ok(Json(updated.into()))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub reset_token: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub new_password: String,
}

/// Complete the password reset flow with a token from /verify-reset-otp
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate()?;

    let claims = state
        .tokens
        .verify(&payload.reset_token)
        .map_err(|_| ApiError::Unauthenticated("Invalid or expired token".to_string()))?;

    let password_hash = hash_password(&payload.new_password)?;
    User::update_password(claims.user_id, &password_hash, &state.db_pool).await?;
    info!(user_id = %claims.user_id, "password reset");

    Ok(Json(MessageResponse {
        message: "Password has been reset successfully.".to_string(),
    }))
}
