pub mod delivery;
pub mod jwt;
pub mod models;
pub mod otp;
pub mod password;

pub use delivery::{MockOtpSender, OtpSender, SadeemSender};
pub use jwt::{Claims, TokenService};
pub use models::{OtpRecord, OtpStatus};
pub use otp::{OtpConfig, OtpError, OtpManager, VerifyOutcome};
