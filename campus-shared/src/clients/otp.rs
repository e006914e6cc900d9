use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::errors::{AppError, ErrorCode};

const OTP_LENGTH: usize = 6;

/// Where the one-time code was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpChannel {
    Email(String),
    Sms(String),
}

impl OtpChannel {
    pub fn identifier(&self) -> &str {
        match self {
            OtpChannel::Email(v) | OtpChannel::Sms(v) => v,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("Invalid OTP")]
    Rejected,

    #[error("Invalid OTP format")]
    Malformed,

    #[error("OTP verification is not configured")]
    NotConfigured,

    #[error("OTP provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<OtpError> for AppError {
    fn from(err: OtpError) -> Self {
        let code = match &err {
            OtpError::Rejected => ErrorCode::OtpInvalid,
            OtpError::Malformed => ErrorCode::ValidationError,
            OtpError::NotConfigured => ErrorCode::ServiceUnavailable,
            OtpError::Transport(_) => ErrorCode::InternalError,
        };
        AppError::new(code, err.to_string())
    }
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    token: &'a str,
}

/// Supabase Auth (GoTrue) `verify` endpoint.
#[derive(Clone)]
pub struct SupabaseOtpClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseOtpClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, OtpError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    pub async fn verify(&self, channel: &OtpChannel, code: &str) -> Result<(), OtpError> {
        let request = match channel {
            OtpChannel::Email(email) => VerifyRequest {
                kind: "email",
                email: Some(email),
                phone: None,
                token: code,
            },
            OtpChannel::Sms(phone) => VerifyRequest {
                kind: "sms",
                email: None,
                phone: Some(phone),
                token: code,
            },
        };

        let response = self
            .client
            .post(format!("{}/auth/v1/verify", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "OTP rejected by provider");
            return Err(OtpError::Rejected);
        }

        Ok(())
    }
}

/// How OTP codes are checked, decided once at startup.
#[derive(Clone)]
pub enum OtpVerifier {
    Provider(SupabaseOtpClient),
    /// Development-only: any six ASCII digits pass.
    DevFallback,
    Disabled,
}

impl OtpVerifier {
    pub async fn verify(&self, channel: &OtpChannel, code: &str) -> Result<(), OtpError> {
        match self {
            OtpVerifier::Provider(client) => client.verify(channel, code).await,
            OtpVerifier::DevFallback => {
                if is_well_formed_code(code) {
                    Ok(())
                } else {
                    Err(OtpError::Malformed)
                }
            }
            OtpVerifier::Disabled => Err(OtpError::NotConfigured),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            OtpVerifier::Provider(_) => "provider",
            OtpVerifier::DevFallback => "dev-fallback",
            OtpVerifier::Disabled => "disabled",
        }
    }
}

pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}
