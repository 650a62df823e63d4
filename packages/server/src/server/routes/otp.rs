//! OTP request and verification handlers for the signup and reset flows.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::domains::auth::VerifyOutcome;
use crate::domains::users::User;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::CurrentUser;
use crate::server::routes::MessageResponse;

/// Reset tokens only need to outlive the reset form round-trip.
const RESET_TOKEN_MINUTES: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub otp: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub message: String,
    pub is_verified: bool,
}

/// Request a verification code for the authenticated (unverified) user
pub async fn request_otp(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .otp
        .request_code(user.id, &user.phone, state.otp_sender.as_ref(), &state.db_pool)
        .await?;

    Ok(Json(MessageResponse {
        message: "OTP has been sent.".to_string(),
    }))
}

/// Verify the submitted code; success marks the user's phone verified
pub async fn verify_otp(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<(StatusCode, Json<VerifyOtpResponse>), ApiError> {
    validate_code_shape(&payload.otp, state.otp.config().code_length)?;

    let outcome = state
        .otp
        .verify_code(user.id, &payload.otp, &state.db_pool)
        .await?;

    let (status, message, is_verified) = match outcome {
        VerifyOutcome::Verified => {
            User::set_verified(user.id, &state.db_pool).await?;
            info!(user_id = %user.id, "phone number verified");
            (StatusCode::OK, "OTP verified successfully", true)
        }
        VerifyOutcome::Expired => (StatusCode::BAD_REQUEST, "OTP has expired", false),
        VerifyOutcome::Mismatch => (StatusCode::BAD_REQUEST, "Invalid OTP", false),
        VerifyOutcome::NoActiveCode => (StatusCode::BAD_REQUEST, "OTP not found", false),
    };

    Ok((
        status,
        Json(VerifyOtpResponse {
            message: message.to_string(),
            is_verified,
        }),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RequestResetOtpRequest {
    #[validate(length(min = 10, message = "phone must be at least 10 characters"))]
    pub phone: String,
}

/// Request a password-reset code for a registered phone number
pub async fn request_reset_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestResetOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate()?;

    let user = User::find_by_phone(&payload.phone, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Phone number not found".to_string()))?;

    state
        .otp
        .request_code(user.id, &user.phone, state.otp_sender.as_ref(), &state.db_pool)
        .await?;

    Ok(Json(MessageResponse {
        message: "OTP has been sent if the phone number is registered.".to_string(),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyResetOtpRequest {
    #[validate(length(min = 10, message = "phone must be at least 10 characters"))]
    pub phone: String,
    pub otp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenResponse {
    pub reset_token: String,
}

/// Verify a reset code; success yields a short-lived reset token
pub async fn verify_reset_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyResetOtpRequest>,
) -> Result<Json<ResetTokenResponse>, ApiError> {
    payload.validate()?;
    validate_code_shape(&payload.otp, state.otp.config().code_length)?;

    let user = User::find_by_phone(&payload.phone, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Phone number not found".to_string()))?;

    match state
        .otp
        .verify_code(user.id, &payload.otp, &state.db_pool)
        .await?
    {
        VerifyOutcome::Verified => {
            let reset_token = state.tokens.issue(
                user.id,
                user.phone.clone(),
                Duration::minutes(RESET_TOKEN_MINUTES),
            )?;
            info!(user_id = %user.id, "reset OTP verified");
            Ok(Json(ResetTokenResponse { reset_token }))
        }
        VerifyOutcome::Expired => Err(ApiError::Validation("OTP has expired".to_string())),
        VerifyOutcome::Mismatch => Err(ApiError::Validation("Invalid OTP".to_string())),
        VerifyOutcome::NoActiveCode => Err(ApiError::Validation("OTP not found".to_string())),
    }
}

/// Codes are fixed-length numeric strings; length follows configuration.
fn validate_code_shape(code: &str, expected_len: usize) -> Result<(), ApiError> {
    if code.len() != expected_len || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::Validation(format!(
            "otp must be {} digits",
            expected_len
        )));
    }
    Ok(())
}
