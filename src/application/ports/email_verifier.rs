//! Deliverability verification port.
//!
//! A verifier is an untrusted, slow collaborator. Implementations make exactly
//! one attempt per call and report every failure mode as a [`VerifierError`];
//! the intake use case treats any error as "not deliverable".

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::email_address::EmailAddress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    pub reason: Option<String>,
}

impl Verdict {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifierError {
    #[error("verifier request failed: {0}")]
    Transport(String),

    #[error("verifier responded with HTTP {0}")]
    Status(u16),

    #[error("verifier returned a malformed payload: {0}")]
    Malformed(String),

    #[error("verifier did not answer within {0:?}")]
    Timeout(Duration),

    #[error("verifier process failed: {0}")]
    Process(String),
}

#[async_trait]
pub trait EmailVerifier: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn verify(&self, email: &EmailAddress) -> Result<Verdict, VerifierError>;
}
