//! Todo handlers, gated by the permission evaluator.
//!
//! Non-create actions load the todo first, so a missing id is 404 before
//! any permission decision (which would otherwise be 403).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domains::authz::{Action, Resource, ResourceData};
use crate::domains::todos::Todo;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::CurrentUser;
use crate::server::routes::authorize;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub invited_users: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

pub async fn get_todo(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Todo>, ApiError> {
    let todo = load_todo(id, &state).await?;
    authorize(
        &state,
        &user,
        Resource::Todos,
        Action::View,
        Some(&ResourceData::Todo(todo.clone())),
    )
    .await?;
    Ok(Json(todo))
}

pub async fn create_todo(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    payload.validate()?;
    authorize(&state, &user, Resource::Todos, Action::Create, None).await?;

    let todo = Todo::insert(&payload.title, user.id, &payload.invited_users, &state.db_pool).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    let todo = load_todo(id, &state).await?;
    authorize(
        &state,
        &user,
        Resource::Todos,
        Action::Update,
        Some(&ResourceData::Todo(todo)),
    )
    .await?;

    let updated = Todo::update(
        id,
        payload.title.as_deref(),
        payload.completed,
        &state.db_pool,
    )
    .await?;
    Ok(Json(updated))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let todo = load_todo(id, &state).await?;
    authorize(
        &state,
        &user,
        Resource::Todos,
        Action::Delete,
        Some(&ResourceData::Todo(todo)),
    )
    .await?;

    Todo::delete(id, &state.db_pool).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_todo(id: Uuid, state: &AppState) -> Result<Todo, ApiError> {
    Todo::find_by_id(id, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))
}
