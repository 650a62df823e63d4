pub mod models;

pub use models::{NewUser, PublicUser, User};
