//! OTP delivery boundary.
//!
//! The provider generates the code, dispatches the SMS, and returns the code
//! for local storage. Any provider failure is fatal to the issuance attempt.

use anyhow::Result;
use async_trait::async_trait;
use sadeem::SadeemService;
use std::sync::{Arc, Mutex};

/// Sends a one-time code to a phone number and returns the code that was sent
#[async_trait]
pub trait OtpSender: Send + Sync {
    async fn send_otp(&self, phone: &str) -> Result<String>;
}

/// Adapter over the Sadeem pin API implementing [`OtpSender`]
pub struct SadeemSender(pub Arc<SadeemService>);

impl SadeemSender {
    pub fn new(service: Arc<SadeemService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl OtpSender for SadeemSender {
    async fn send_otp(&self, phone: &str) -> Result<String> {
        self.0
            .send_otp(phone)
            .await
            .map(|response| response.pin)
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// Mock Sender (for tests)
// =============================================================================

/// Mock sender that records calls and returns queued codes.
///
/// When the queue is empty, a fixed default code is returned.
pub struct MockOtpSender {
    queued: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

pub const MOCK_DEFAULT_CODE: &str = "123456";

impl MockOtpSender {
    pub fn new() -> Self {
        Self {
            queued: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a code to be returned by the next send call
    pub fn with_code(self, code: &str) -> Self {
        self.queued.lock().unwrap().push(code.to_string());
        self
    }

    /// Phone numbers passed to send calls, in order
    pub fn sent_to(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockOtpSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpSender for MockOtpSender {
    async fn send_otp(&self, phone: &str) -> Result<String> {
        self.calls.lock().unwrap().push(phone.to_string());
        let mut queued = self.queued.lock().unwrap();
        let code = if queued.is_empty() {
            MOCK_DEFAULT_CODE.to_string()
        } else {
            queued.remove(0)
        };
        Ok(code)
    }
}
