// Client for the Sadeem Factory OTP pin API (https://otp.sadeem-factory.com)

use std::collections::HashMap;

pub mod models;
use reqwest::{header, Client};

use crate::models::PinResponse;

pub const DEFAULT_BASE_URL: &str = "https://otp.sadeem-factory.com";

#[derive(Debug, Clone)]
pub struct SadeemOptions {
    pub api_token: String,
    pub base_url: String,
    /// When set, pins are created in test mode and no SMS is dispatched.
    pub test_mode: bool,
}

impl SadeemOptions {
    pub fn new(api_token: String) -> Self {
        Self {
            api_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            test_mode: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SadeemService {
    options: SadeemOptions,
}

impl SadeemService {
    pub fn new(options: SadeemOptions) -> Self {
        Self { options }
    }

    /// Create a pin for the given phone number.
    ///
    /// The provider sends the SMS and returns the generated pin.
    pub async fn send_otp(&self, phone: &str) -> Result<PinResponse, &'static str> {
        let url = format!(
            "{base}/api/v1/pins{test}",
            base = self.options.base_url,
            test = if self.options.test_mode { "?test=" } else { "" }
        );

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", self.options.api_token)
                .parse()
                .expect("Header value should parse correctly"),
        );

        let mut body: HashMap<&str, String> = HashMap::new();
        body.insert("phone", phone.to_string());

        let client = Client::new();
        let res = client.post(url).headers(headers).json(&body).send().await;

        match res {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    let error_body = response.text().await.unwrap_or_default();
                    eprintln!("Sadeem error ({}): {}", status, error_body);
                    return Err("OTP provider returned an error");
                }

                match response.json::<PinResponse>().await {
                    Ok(data) => Ok(data),
                    Err(e) => {
                        eprintln!("Failed to parse Sadeem response: {}", e);
                        Err("Error parsing pin response")
                    }
                }
            }
            Err(e) => {
                eprintln!("Request to Sadeem failed: {}", e);
                Err("Error sending OTP")
            }
        }
    }
}
