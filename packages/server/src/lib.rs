// WellSync - phone-number authentication API
//
// Phone + password identities, OTP phone verification and password reset,
// and a role/permission authorization layer over comments and todos.

pub mod config;
pub mod domains;
pub mod server;

pub use config::*;
