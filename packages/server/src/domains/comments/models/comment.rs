use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Comment row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub body: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Find comment by ID
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert a new comment
    pub async fn insert(body: &str, author_id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO comments (body, author_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(body)
        .bind(author_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Replace the comment body
    pub async fn update_body(id: Uuid, body: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("UPDATE comments SET body = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(body)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }
}
