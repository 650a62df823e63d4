pub mod evaluator;
pub mod models;
pub mod rules;

pub use evaluator::PermissionEvaluator;
pub use models::seed_defaults;
pub use rules::{Action, Resource, ResourceData, RoleName, Rule, RuleSet};
