//! Bearer authentication guards.
//!
//! Both variants run the same procedure: extract the bearer token, verify it,
//! load the user. They differ only in the verification state they admit. The
//! user travels to handlers as a request-scoped extension value.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::domains::users::User;
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// The authenticated user for the current request
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Admits only authenticated users with a verified phone number
pub async fn require_verified(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await?;
    if !user.is_verified {
        return Err(ApiError::Unauthenticated(
            "Phone number not verified".to_string(),
        ));
    }

    debug!(user_id = %user.id, "authenticated verified user");
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Admits only authenticated users that have NOT verified yet.
///
/// Gates the OTP request/verify endpoints so verified users cannot
/// re-trigger the flow.
pub async fn require_unverified(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await?;
    if user.is_verified {
        return Err(ApiError::Unauthenticated(
            "Phone number already verified".to_string(),
        ));
    }

    debug!(user_id = %user.id, "authenticated unverified user");
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Token extraction + verification + user load shared by both guards.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthenticated("No token provided".to_string()))?;

    let claims = state.tokens.verify(token).map_err(|e| {
        debug!(error = %e, "token verification failed");
        ApiError::Unauthenticated("Unauthorized".to_string())
    })?;

    User::find_by_id(claims.user_id, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Invalid token".to_string()))
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ")
}
