//! Declarative role rules: an immutable table from (role, resource, action)
//! to either a boolean grant or a predicate over the acting user and the
//! loaded resource instance.
//!
//! Predicates are pure functions over immutable snapshots; the table is
//! built once at startup and never mutated.

use std::collections::HashMap;

use crate::domains::comments::Comment;
use crate::domains::todos::Todo;
use crate::domains::users::User;

/// Authorization subject type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Comments,
    Todos,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Comments => "comments",
            Resource::Todos => "todos",
        }
    }
}

/// Operation requested on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// Built-in role names. Stored roles outside this set carry no declarative
/// rules (they may still hold relational grants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleName {
    Admin,
    Moderator,
    User,
}

impl RoleName {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "admin" => Some(RoleName::Admin),
            "moderator" => Some(RoleName::Moderator),
            "user" => Some(RoleName::User),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoleName::Admin => "admin",
            RoleName::Moderator => "moderator",
            RoleName::User => "user",
        }
    }
}

/// Resource instance handed to predicates for data-dependent decisions.
#[derive(Debug, Clone)]
pub enum ResourceData {
    Comment(Comment),
    Todo(Todo),
}

type Predicate = fn(&User, &ResourceData) -> bool;

/// A single rule: unconditional, or dependent on the loaded resource.
#[derive(Clone, Copy)]
pub enum Rule {
    Allow(bool),
    When(Predicate),
}

/// Immutable rule table, built once at startup.
pub struct RuleSet {
    rules: HashMap<(RoleName, Resource, Action), Rule>,
}

impl RuleSet {
    /// The built-in rules for admin, moderator, and user.
    pub fn defaults() -> Self {
        use Action::{Create, Delete, Update, View};
        use Resource::{Comments, Todos};

        let mut rules: HashMap<(RoleName, Resource, Action), Rule> = HashMap::new();

        // admin: everything, unconditionally
        for action in [View, Create, Update] {
            rules.insert((RoleName::Admin, Comments, action), Rule::Allow(true));
        }
        for action in [View, Create, Update, Delete] {
            rules.insert((RoleName::Admin, Todos, action), Rule::Allow(true));
        }

        // moderator: unconditional, except deleting only completed todos
        for action in [View, Create, Update] {
            rules.insert((RoleName::Moderator, Comments, action), Rule::Allow(true));
            rules.insert((RoleName::Moderator, Todos, action), Rule::Allow(true));
        }
        rules.insert(
            (RoleName::Moderator, Todos, Delete),
            Rule::When(|_, data| match data {
                ResourceData::Todo(todo) => todo.completed,
                _ => false,
            }),
        );

        // user: block-list and ownership predicates
        rules.insert(
            (RoleName::User, Comments, View),
            Rule::When(|user, data| match data {
                ResourceData::Comment(comment) => !user.blocked_by.contains(&comment.author_id),
                _ => false,
            }),
        );
        rules.insert((RoleName::User, Comments, Create), Rule::Allow(true));
        rules.insert(
            (RoleName::User, Comments, Update),
            Rule::When(|user, data| match data {
                ResourceData::Comment(comment) => comment.author_id == user.id,
                _ => false,
            }),
        );
        rules.insert(
            (RoleName::User, Todos, View),
            Rule::When(|user, data| match data {
                ResourceData::Todo(todo) => !user.blocked_by.contains(&todo.user_id),
                _ => false,
            }),
        );
        rules.insert((RoleName::User, Todos, Create), Rule::Allow(true));
        rules.insert(
            (RoleName::User, Todos, Update),
            Rule::When(|user, data| match data {
                ResourceData::Todo(todo) => {
                    todo.user_id == user.id || todo.invited_users.contains(&user.id)
                }
                _ => false,
            }),
        );
        rules.insert(
            (RoleName::User, Todos, Delete),
            Rule::When(|user, data| match data {
                ResourceData::Todo(todo) => {
                    (todo.user_id == user.id || todo.invited_users.contains(&user.id))
                        && todo.completed
                }
                _ => false,
            }),
        );

        Self { rules }
    }

    /// Whether `role` grants `action` on `resource`, given the optionally
    /// loaded resource data.
    ///
    /// Missing entry: no grant. Predicate without data: no grant.
    pub fn grants(
        &self,
        role: RoleName,
        user: &User,
        resource: Resource,
        action: Action,
        data: Option<&ResourceData>,
    ) -> bool {
        match self.rules.get(&(role, resource, action)) {
            None => false,
            Some(Rule::Allow(allowed)) => *allowed,
            Some(Rule::When(predicate)) => data.map_or(false, |d| predicate(user, d)),
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_user(id: Uuid, blocked_by: Vec<Uuid>) -> User {
        User {
            id,
            phone: "+1234567890".to_string(),
            password_hash: "x".to_string(),
            name: "Test".to_string(),
            user_type: 0,
            latitude: None,
            longitude: None,
            street: None,
            is_verified: true,
            blocked_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_todo(owner: Uuid, invited: Vec<Uuid>, completed: bool) -> ResourceData {
        ResourceData::Todo(Todo {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            user_id: owner,
            completed,
            invited_users: invited,
            created_at: Utc::now(),
        })
    }

    fn make_comment(author: Uuid) -> ResourceData {
        ResourceData::Comment(Comment {
            id: Uuid::new_v4(),
            body: "c".to_string(),
            author_id: author,
            created_at: Utc::now(),
        })
    }

    #[test]
    fn test_admin_grants_without_data() {
        let rules = RuleSet::defaults();
        let user = make_user(Uuid::new_v4(), vec![]);

        assert!(rules.grants(RoleName::Admin, &user, Resource::Todos, Action::Delete, None));
        assert!(rules.grants(RoleName::Admin, &user, Resource::Comments, Action::Update, None));
    }

    #[test]
    fn test_moderator_deletes_only_completed_todos() {
        let rules = RuleSet::defaults();
        let user = make_user(Uuid::new_v4(), vec![]);
        let owner = Uuid::new_v4();

        let completed = make_todo(owner, vec![], true);
        let open = make_todo(owner, vec![], false);

        assert!(rules.grants(RoleName::Moderator, &user, Resource::Todos, Action::Delete, Some(&completed)));
        assert!(!rules.grants(RoleName::Moderator, &user, Resource::Todos, Action::Delete, Some(&open)));
    }

    #[test]
    fn test_predicate_without_data_denies() {
        let rules = RuleSet::defaults();
        let user = make_user(Uuid::new_v4(), vec![]);

        assert!(!rules.grants(RoleName::Moderator, &user, Resource::Todos, Action::Delete, None));
        assert!(!rules.grants(RoleName::User, &user, Resource::Todos, Action::Update, None));
    }

    #[test]
    fn test_user_updates_own_or_invited_todos() {
        let rules = RuleSet::defaults();
        let user = make_user(Uuid::new_v4(), vec![]);
        let stranger = Uuid::new_v4();

        let own = make_todo(user.id, vec![], false);
        let invited = make_todo(stranger, vec![user.id], false);
        let other = make_todo(stranger, vec![], false);

        assert!(rules.grants(RoleName::User, &user, Resource::Todos, Action::Update, Some(&own)));
        assert!(rules.grants(RoleName::User, &user, Resource::Todos, Action::Update, Some(&invited)));
        assert!(!rules.grants(RoleName::User, &user, Resource::Todos, Action::Update, Some(&other)));
    }

    #[test]
    fn test_user_deletes_require_completion_too() {
        let rules = RuleSet::defaults();
        let user = make_user(Uuid::new_v4(), vec![]);

        let own_open = make_todo(user.id, vec![], false);
        let own_done = make_todo(user.id, vec![], true);

        assert!(!rules.grants(RoleName::User, &user, Resource::Todos, Action::Delete, Some(&own_open)));
        assert!(rules.grants(RoleName::User, &user, Resource::Todos, Action::Delete, Some(&own_done)));
    }

    #[test]
    fn test_block_list_hides_content() {
        let rules = RuleSet::defaults();
        let author = Uuid::new_v4();
        let blocked_viewer = make_user(Uuid::new_v4(), vec![author]);
        let viewer = make_user(Uuid::new_v4(), vec![]);

        let comment = make_comment(author);
        assert!(!rules.grants(RoleName::User, &blocked_viewer, Resource::Comments, Action::View, Some(&comment)));
        assert!(rules.grants(RoleName::User, &viewer, Resource::Comments, Action::View, Some(&comment)));

        let todo = make_todo(author, vec![], false);
        assert!(!rules.grants(RoleName::User, &blocked_viewer, Resource::Todos, Action::View, Some(&todo)));
    }

    #[test]
    fn test_user_edits_only_own_comments() {
        let rules = RuleSet::defaults();
        let user = make_user(Uuid::new_v4(), vec![]);

        let own = make_comment(user.id);
        let other = make_comment(Uuid::new_v4());

        assert!(rules.grants(RoleName::User, &user, Resource::Comments, Action::Update, Some(&own)));
        assert!(!rules.grants(RoleName::User, &user, Resource::Comments, Action::Update, Some(&other)));
    }

    #[test]
    fn test_missing_entry_denies() {
        let rules = RuleSet::defaults();
        let user = make_user(Uuid::new_v4(), vec![]);

        // comments have no delete action for any role
        assert!(!rules.grants(RoleName::Admin, &user, Resource::Comments, Action::Delete, None));
        assert!(!rules.grants(RoleName::User, &user, Resource::Comments, Action::Delete, None));
    }
}
