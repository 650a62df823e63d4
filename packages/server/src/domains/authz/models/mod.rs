mod role;

pub use role::{load_grants, seed_defaults, GrantRow, Permission, Role};
