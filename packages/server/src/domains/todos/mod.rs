pub mod models;

pub use models::Todo;
