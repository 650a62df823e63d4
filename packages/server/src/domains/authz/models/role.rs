use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Role row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Permission row: a (resource, action) pair
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub resource: String,
    pub action: String,
}

/// One row of the user -> roles -> role_permissions -> permissions fan-out.
///
/// Permission columns are NULL for roles without grants (LEFT JOIN).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GrantRow {
    pub role_name: String,
    pub resource: Option<String>,
    pub action: Option<String>,
    pub is_always_allowed: Option<bool>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Role {
    /// Find role by unique name
    pub async fn find_by_name(name: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Assign this role to a user (idempotent)
    pub async fn assign_to_user(role_id: Uuid, user_id: Uuid, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

/// Load the full grant fan-out for a user in a single query.
pub async fn load_grants(user_id: Uuid, pool: &PgPool) -> Result<Vec<GrantRow>> {
    sqlx::query_as::<_, GrantRow>(
        "SELECT r.name AS role_name, p.resource, p.action, rp.is_always_allowed
         FROM user_roles ur
         JOIN roles r ON r.id = ur.role_id
         LEFT JOIN role_permissions rp ON rp.role_id = r.id
         LEFT JOIN permissions p ON p.id = rp.permission_id
         WHERE ur.user_id = $1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

/// Idempotently create the default roles and permissions, and link the
/// admin role to every permission as an unconditional grant.
pub async fn seed_defaults(pool: &PgPool) -> Result<()> {
    let default_permissions: [(&str, &[&str]); 2] = [
        ("comments", &["view", "create", "update"]),
        ("todos", &["view", "create", "update", "delete"]),
    ];

    for (resource, actions) in default_permissions {
        for action in actions {
            sqlx::query(
                "INSERT INTO permissions (resource, action) VALUES ($1, $2)
                 ON CONFLICT (resource, action) DO NOTHING",
            )
            .bind(resource)
            .bind(action)
            .execute(pool)
            .await?;
        }
    }

    for role in ["admin", "moderator", "user"] {
        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(role)
            .execute(pool)
            .await?;
    }

    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id, is_always_allowed)
         SELECT r.id, p.id, true
         FROM roles r CROSS JOIN permissions p
         WHERE r.name = 'admin'
         ON CONFLICT (role_id, permission_id) DO NOTHING",
    )
    .execute(pool)
    .await?;

    Ok(())
}
