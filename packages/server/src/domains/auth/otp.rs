//! OTP lifecycle: issuance under a resend cooldown, verification against the
//! most recent code, expiry that consumes the code without granting success.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::delivery::OtpSender;
use super::models::{OtpRecord, OtpStatus};

/// OTP tuning. Defaults: 6-digit codes, 5 minute expiry, 2 minute resend
/// cooldown.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    pub code_length: usize,
    pub expiry: Duration,
    pub resend_cooldown: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            expiry: Duration::minutes(5),
            resend_cooldown: Duration::minutes(2),
        }
    }
}

#[derive(Debug, Error)]
pub enum OtpError {
    /// A code was issued less than the cooldown window ago.
    #[error("Please wait {wait_secs} seconds before requesting a new OTP.")]
    CooldownActive { wait_secs: u64 },

    /// The delivery provider failed; the issuance attempt is abandoned.
    #[error("OTP delivery failed")]
    Delivery(#[source] anyhow::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Outcome of a verification attempt against the most recent code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Code matched inside the expiry window; the record is now closed.
    Verified,
    /// The window elapsed; the record is closed and the code is spent.
    Expired,
    /// Code did not match; the record stays open for another attempt.
    Mismatch,
    /// No code is awaiting verification for this user.
    NoActiveCode,
}

/// Drives the per-user OTP state machine over the otps table.
#[derive(Debug, Clone)]
pub struct OtpManager {
    config: OtpConfig,
}

impl OtpManager {
    pub fn new(config: OtpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// Issue a new code for the user, enforcing the resend cooldown.
    ///
    /// The cooldown pre-check produces the precise wait message; the insert
    /// itself is conditional on no record existing inside the window, so two
    /// racing requests cannot both issue.
    pub async fn request_code(
        &self,
        user_id: Uuid,
        phone: &str,
        sender: &dyn OtpSender,
        pool: &PgPool,
    ) -> Result<(), OtpError> {
        let now = Utc::now();
        if let Some(latest) = OtpRecord::latest_for_user(user_id, pool).await? {
            if let Some(wait_secs) =
                remaining_cooldown(latest.issued_at, now, self.config.resend_cooldown)
            {
                return Err(OtpError::CooldownActive { wait_secs });
            }
        }

        let code = sender.send_otp(phone).await.map_err(OtpError::Delivery)?;

        let cutoff = now - self.config.resend_cooldown;
        let inserted = OtpRecord::insert_if_none_since(user_id, &code, now, cutoff, pool).await?;
        if inserted.is_none() {
            // Lost the window to a concurrent issuance for the same user.
            warn!(%user_id, "concurrent OTP issuance suppressed");
            let wait_secs = OtpRecord::latest_for_user(user_id, pool)
                .await?
                .and_then(|r| {
                    remaining_cooldown(r.issued_at, Utc::now(), self.config.resend_cooldown)
                })
                .unwrap_or(1);
            return Err(OtpError::CooldownActive { wait_secs });
        }

        info!(%user_id, "OTP issued");
        Ok(())
    }

    /// Check a submitted code against the user's most recent record.
    pub async fn verify_code(
        &self,
        user_id: Uuid,
        code: &str,
        pool: &PgPool,
    ) -> Result<VerifyOutcome, OtpError> {
        let Some(record) = OtpRecord::latest_for_user(user_id, pool).await? else {
            return Ok(VerifyOutcome::NoActiveCode);
        };

        match record.status {
            OtpStatus::Verified => Ok(VerifyOutcome::NoActiveCode),
            OtpStatus::Expired => Ok(VerifyOutcome::Expired),
            OtpStatus::Issued => {
                if is_expired(record.issued_at, Utc::now(), self.config.expiry) {
                    OtpRecord::set_status(record.id, OtpStatus::Expired, pool).await?;
                    info!(%user_id, "OTP expired on verification attempt");
                    return Ok(VerifyOutcome::Expired);
                }
                if record.code != code {
                    return Ok(VerifyOutcome::Mismatch);
                }
                OtpRecord::set_status(record.id, OtpStatus::Verified, pool).await?;
                info!(%user_id, "OTP verified");
                Ok(VerifyOutcome::Verified)
            }
        }
    }
}

/// Remaining cooldown in whole seconds (rounded up), or None once the window
/// has passed.
pub fn remaining_cooldown(
    issued_at: DateTime<Utc>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Option<u64> {
    let elapsed_ms = (now - issued_at).num_milliseconds();
    let cooldown_ms = cooldown.num_milliseconds();
    if elapsed_ms >= cooldown_ms {
        return None;
    }
    let wait_ms = cooldown_ms - elapsed_ms;
    Some(((wait_ms + 999) / 1000) as u64)
}

/// Whether a code issued at `issued_at` has outlived the expiry window.
pub fn is_expired(issued_at: DateTime<Utc>, now: DateTime<Utc>, expiry: Duration) -> bool {
    now - issued_at > expiry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_remaining_cooldown_rounds_up() {
        let cooldown = Duration::minutes(2);

        // 30s elapsed of 120s -> 90s remain
        assert_eq!(remaining_cooldown(at(0), at(30), cooldown), Some(90));
        // sub-second remainder rounds up to a whole second
        let now = at(0) + Duration::milliseconds(119_001);
        assert_eq!(remaining_cooldown(at(0), now, cooldown), Some(1));
    }

    #[test]
    fn test_remaining_cooldown_full_window_just_issued() {
        let cooldown = Duration::minutes(2);
        assert_eq!(remaining_cooldown(at(0), at(0), cooldown), Some(120));
    }

    #[test]
    fn test_cooldown_clears_at_window_edge() {
        let cooldown = Duration::minutes(2);
        assert_eq!(remaining_cooldown(at(0), at(120), cooldown), None);
        assert_eq!(remaining_cooldown(at(0), at(121), cooldown), None);
    }

    #[test]
    fn test_is_expired_boundary() {
        let expiry = Duration::minutes(5);
        assert!(!is_expired(at(0), at(299), expiry));
        // exactly at the window edge is still valid
        assert!(!is_expired(at(0), at(300), expiry));
        assert!(is_expired(at(0), at(301), expiry));
    }
}
