// HTTP routes
pub mod comments;
pub mod health;
pub mod otp;
pub mod todos;
pub mod users;

use serde::Serialize;

use crate::domains::authz::{Action, Resource, ResourceData};
use crate::domains::users::User;
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// Plain message body used by several endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Run the permission evaluator for a handler; denial becomes 403.
///
/// Callers load the resource first, so a missing resource has already
/// surfaced as 404 by the time this runs.
pub(crate) async fn authorize(
    state: &AppState,
    user: &User,
    resource: Resource,
    action: Action,
    data: Option<&ResourceData>,
) -> Result<(), ApiError> {
    let allowed = state
        .permissions
        .evaluate_for_user(user, resource, action, data, &state.db_pool)
        .await?;
    if allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
