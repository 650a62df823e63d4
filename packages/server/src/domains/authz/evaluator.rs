//! Permission decisions combining two strategies: relational grant rows and
//! the declarative rule table.

use anyhow::Result;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::models::{load_grants, GrantRow};
use super::rules::{Action, Resource, ResourceData, RoleName, RuleSet};
use crate::domains::users::User;

/// Resolves whether a user may perform an action on a resource.
///
/// Combination rule: a grant from any held role, via either strategy,
/// authorizes (logical OR). Denial is a normal `false`; the evaluator never
/// errors for a denied check.
pub struct PermissionEvaluator {
    rules: RuleSet,
}

impl PermissionEvaluator {
    pub fn new() -> Self {
        Self {
            rules: RuleSet::defaults(),
        }
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Evaluate for a user id, loading the user and their role fan-out.
    ///
    /// A missing user yields `false` (fail-closed), never an error.
    pub async fn evaluate(
        &self,
        user_id: Uuid,
        resource: Resource,
        action: Action,
        data: Option<&ResourceData>,
        pool: &PgPool,
    ) -> Result<bool> {
        let Some(user) = User::find_by_id(user_id, pool).await? else {
            debug!(%user_id, "permission check for unknown user");
            return Ok(false);
        };
        self.evaluate_for_user(&user, resource, action, data, pool).await
    }

    /// Evaluate for an already-loaded user.
    pub async fn evaluate_for_user(
        &self,
        user: &User,
        resource: Resource,
        action: Action,
        data: Option<&ResourceData>,
        pool: &PgPool,
    ) -> Result<bool> {
        let grants = load_grants(user.id, pool).await?;
        Ok(self.decide(user, &grants, resource, action, data))
    }

    /// Pure decision over a loaded grant fan-out.
    pub fn decide(
        &self,
        user: &User,
        grants: &[GrantRow],
        resource: Resource,
        action: Action,
        data: Option<&ResourceData>,
    ) -> bool {
        // Relational strategy: any (resource, action) row held via any role.
        let relational = grants.iter().any(|row| {
            row.resource.as_deref() == Some(resource.as_str())
                && row.action.as_deref() == Some(action.as_str())
        });
        if relational {
            return true;
        }

        // Declarative strategy: the rule table over the user's role names.
        grants
            .iter()
            .filter_map(|row| RoleName::parse(&row.role_name))
            .any(|role| self.rules.grants(role, user, resource, action, data))
    }
}

impl Default for PermissionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_user() -> User {
        User {
            id: Uuid::new_v4(),
            phone: "+1234567890".to_string(),
            password_hash: "x".to_string(),
            name: "Test".to_string(),
            user_type: 0,
            latitude: None,
            longitude: None,
            street: None,
            is_verified: true,
            blocked_by: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn role_row(role: &str) -> GrantRow {
        GrantRow {
            role_name: role.to_string(),
            resource: None,
            action: None,
            is_always_allowed: None,
        }
    }

    fn grant_row(role: &str, resource: &str, action: &str) -> GrantRow {
        GrantRow {
            role_name: role.to_string(),
            resource: Some(resource.to_string()),
            action: Some(action.to_string()),
            is_always_allowed: Some(false),
        }
    }

    #[test]
    fn test_relational_row_grants_without_data() {
        let evaluator = PermissionEvaluator::new();
        let user = make_user();

        // A custom role unknown to the rule table still grants relationally
        let grants = vec![grant_row("auditor", "todos", "delete")];
        assert!(evaluator.decide(&user, &grants, Resource::Todos, Action::Delete, None));
        assert!(!evaluator.decide(&user, &grants, Resource::Todos, Action::Update, None));
    }

    #[test]
    fn test_declarative_rules_apply_when_no_relational_row() {
        let evaluator = PermissionEvaluator::new();
        let user = make_user();

        let grants = vec![role_row("user")];
        // create needs no data and the user role allows it
        assert!(evaluator.decide(&user, &grants, Resource::Todos, Action::Create, None));
        // update needs data that is absent
        assert!(!evaluator.decide(&user, &grants, Resource::Todos, Action::Update, None));
    }

    #[test]
    fn test_any_permissive_role_suffices() {
        let evaluator = PermissionEvaluator::new();
        let user = make_user();

        // user role alone cannot delete an open todo; admin can
        let todo = ResourceData::Todo(crate::domains::todos::Todo {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            user_id: Uuid::new_v4(),
            completed: false,
            invited_users: vec![],
            created_at: Utc::now(),
        });

        let just_user = vec![role_row("user")];
        assert!(!evaluator.decide(&user, &just_user, Resource::Todos, Action::Delete, Some(&todo)));

        let user_and_admin = vec![role_row("user"), role_row("admin")];
        assert!(evaluator.decide(&user, &user_and_admin, Resource::Todos, Action::Delete, Some(&todo)));
    }

    #[test]
    fn test_no_roles_denies() {
        let evaluator = PermissionEvaluator::new();
        let user = make_user();

        assert!(!evaluator.decide(&user, &[], Resource::Comments, Action::Create, None));
    }

    #[test]
    fn test_unknown_role_name_contributes_nothing() {
        let evaluator = PermissionEvaluator::new();
        let user = make_user();

        let grants = vec![role_row("superuser")];
        assert!(!evaluator.decide(&user, &grants, Resource::Todos, Action::Create, None));
    }
}
