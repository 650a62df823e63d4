use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::auth::OtpConfig;

/// Server configuration loaded once at startup; no runtime mutation.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub otp_api_token: String,
    pub otp_base_url: String,
    pub otp_test_mode: bool,
    pub otp_code_length: usize,
    pub otp_expiry_secs: i64,
    pub otp_resend_cooldown_secs: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "wellsync".to_string()),
            otp_api_token: env::var("OTP_API_TOKEN").context("OTP_API_TOKEN must be set")?,
            otp_base_url: env::var("OTP_BASE_URL")
                .unwrap_or_else(|_| sadeem::DEFAULT_BASE_URL.to_string()),
            otp_test_mode: env::var("OTP_TEST_MODE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            otp_code_length: env::var("OTP_CODE_LENGTH")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .context("OTP_CODE_LENGTH must be a valid number")?,
            otp_expiry_secs: env::var("OTP_EXPIRY_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("OTP_EXPIRY_SECS must be a valid number")?,
            otp_resend_cooldown_secs: env::var("OTP_RESEND_COOLDOWN_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .context("OTP_RESEND_COOLDOWN_SECS must be a valid number")?,
        })
    }

    /// OTP lifecycle tuning derived from the environment.
    pub fn otp_config(&self) -> OtpConfig {
        OtpConfig {
            code_length: self.otp_code_length,
            expiry: chrono::Duration::seconds(self.otp_expiry_secs),
            resend_cooldown: chrono::Duration::seconds(self.otp_resend_cooldown_secs),
        }
    }
}
