pub mod auth;
pub mod authz;
pub mod comments;
pub mod todos;
pub mod users;
