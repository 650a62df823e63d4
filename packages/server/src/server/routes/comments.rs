//! Comment handlers, gated by the permission evaluator.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domains::authz::{Action, Resource, ResourceData};
use crate::domains::comments::Comment;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::CurrentUser;
use crate::server::routes::authorize;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "body must not be empty"))]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, message = "body must not be empty"))]
    pub body: String,
}

pub async fn get_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Comment>, ApiError> {
    let comment = load_comment(id, &state).await?;
    authorize(
        &state,
        &user,
        Resource::Comments,
        Action::View,
        Some(&ResourceData::Comment(comment.clone())),
    )
    .await?;
    Ok(Json(comment))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    payload.validate()?;
    authorize(&state, &user, Resource::Comments, Action::Create, None).await?;

    let comment = Comment::insert(&payload.body, user.id, &state.db_pool).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    payload.validate()?;

    let comment = load_comment(id, &state).await?;
    authorize(
        &state,
        &user,
        Resource::Comments,
        Action::Update,
        Some(&ResourceData::Comment(comment)),
    )
    .await?;

    let updated = Comment::update_body(id, &payload.body, &state.db_pool).await?;
    Ok(Json(updated))
}

async fn load_comment(id: Uuid, state: &AppState) -> Result<Comment, ApiError> {
    Comment::find_by_id(id, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))
}
