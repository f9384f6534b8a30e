use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{
    application::ports::email_verifier::{EmailVerifier, Verdict, VerifierError},
    domain::email_address::EmailAddress,
    infra::http_client,
};

/// SMTP probe budget the remote service is asked to respect.
const REMOTE_PROBE_TIMEOUT_SECS: u8 = 10;
const SMTP_PORT: u16 = 25;

/// Verifier backed by a third-party "quick mail verify" HTTP endpoint.
pub struct HttpEmailVerifier {
    client: Client,
    url: Url,
    token: SecretString,
    timeout: Duration,
}

impl HttpEmailVerifier {
    pub fn new(url: Url, token: SecretString, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client::build_client_with_timeout(timeout)?,
            url,
            token,
            timeout,
        })
    }
}

#[derive(Serialize)]
struct VerifyForm<'a> {
    email: &'a str,
    index: u32,
    token: &'a str,
    frommail: &'a str,
    timeout: u8,
    scan_port: u16,
}

#[derive(Deserialize, Debug)]
struct VerifyResponse {
    status: Option<String>,
    safetosend: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    reasons: Option<serde_json::Value>,
}

impl VerifyResponse {
    fn is_deliverable(&self) -> bool {
        self.status.as_deref() == Some("valid") && self.safetosend.as_deref() == Some("Yes")
    }

    fn rejection_reason(&self) -> String {
        match &self.reasons {
            Some(serde_json::Value::String(reason)) if !reason.is_empty() => reason.clone(),
            Some(serde_json::Value::Array(items)) if !items.is_empty() => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            _ => format!(
                "status={} safetosend={}",
                self.status.as_deref().unwrap_or("unknown"),
                self.safetosend.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

#[async_trait]
impl EmailVerifier for HttpEmailVerifier {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn verify(&self, email: &EmailAddress) -> Result<Verdict, VerifierError> {
        let form = VerifyForm {
            email: email.as_str(),
            index: 0,
            token: self.token.expose_secret(),
            frommail: email.as_str(),
            timeout: REMOTE_PROBE_TIMEOUT_SECS,
            scan_port: SMTP_PORT,
        };

        let response = self
            .client
            .post(self.url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifierError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: VerifyResponse =
            serde_json::from_str(&body).map_err(|e| VerifierError::Malformed(e.to_string()))?;

        debug!(
            status = ?parsed.status,
            safetosend = ?parsed.safetosend,
            kind = ?parsed.kind,
            reasons = ?parsed.reasons,
            "Verification API result"
        );

        if parsed.is_deliverable() {
            Ok(Verdict::valid())
        } else {
            Ok(Verdict::invalid(parsed.rejection_reason()))
        }
    }
}

impl HttpEmailVerifier {
    fn transport_error(&self, err: reqwest::Error) -> VerifierError {
        if err.is_timeout() {
            VerifierError::Timeout(self.timeout)
        } else {
            VerifierError::Transport(err.to_string())
        }
    }
}
