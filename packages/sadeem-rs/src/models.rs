use serde::{Deserialize, Serialize};

/// Response from the pin creation endpoint.
///
/// The provider generates the pin and sends it to the phone via SMS;
/// the pin is echoed back so the caller can store it for verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinResponse {
    pub pin: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
