use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Todo row. Owned by one user; invited users share update rights.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub user_id: Uuid,
    pub completed: bool,
    pub invited_users: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Find todo by ID
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM todos WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert a new todo owned by `user_id`
    pub async fn insert(
        title: &str,
        user_id: Uuid,
        invited_users: &[Uuid],
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO todos (title, user_id, invited_users)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(title)
        .bind(user_id)
        .bind(invited_users)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Update title and/or completion state
    pub async fn update(
        id: Uuid,
        title: Option<&str>,
        completed: Option<bool>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE todos
             SET title = COALESCE($2, title), completed = COALESCE($3, completed)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(title)
        .bind(completed)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Delete a todo
    pub async fn delete(id: Uuid, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
