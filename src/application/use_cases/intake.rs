use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    app_error::{AppError, AppResult},
    application::{
        email_templates,
        ports::email_verifier::{EmailVerifier, Verdict, VerifierError},
    },
    domain::{
        email_address::EmailAddress,
        entities::waitlist_entry::{EntrySource, NewWaitlistEntry, WaitlistEntry},
    },
};

/// Upper bound for the health probe against the store.
const STORE_PING_TIMEOUT: Duration = Duration::from_secs(2);

#[async_trait]
pub trait WaitlistRepo: Send + Sync {
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<WaitlistEntry>>;
    /// Fails with [`AppError::Conflict`] when the email is already stored.
    async fn insert(&self, entry: NewWaitlistEntry) -> AppResult<WaitlistEntry>;
    async fn count(&self) -> AppResult<i64>;
    async fn ping(&self) -> bool;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    InvalidEmail,
    Undeliverable,
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::InvalidEmail => "Valid email is required",
            Rejection::Undeliverable => "Email does not exist!",
        }
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::InvalidEmail => AppError::InvalidInput(rejection.reason().into()),
            Rejection::Undeliverable => AppError::Undeliverable(rejection.reason().into()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum IntakeOutcome {
    Created(WaitlistEntry),
    AlreadyExists,
    Rejected(Rejection),
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliverabilityReport {
    pub email: EmailAddress,
    pub is_valid: bool,
    pub reason: String,
}

pub struct IntakeUseCases {
    repo: Arc<dyn WaitlistRepo>,
    verifier: Arc<dyn EmailVerifier>,
    email: Option<Arc<dyn EmailSender>>,
    verify_timeout: Duration,
    product_name: String,
    app_origin: String,
}

impl IntakeUseCases {
    pub fn new(
        repo: Arc<dyn WaitlistRepo>,
        verifier: Arc<dyn EmailVerifier>,
        email: Option<Arc<dyn EmailSender>>,
        verify_timeout: Duration,
        product_name: String,
        app_origin: String,
    ) -> Self {
        Self {
            repo,
            verifier,
            email,
            verify_timeout,
            product_name,
            app_origin,
        }
    }

    /// Runs the full intake: validate, check, verify, persist, notify.
    ///
    /// Repeated submissions of the same normalized address return
    /// [`IntakeOutcome::AlreadyExists`], including when a concurrent request
    /// wins the insert between our existence check and our write.
    #[instrument(skip(self, raw))]
    pub async fn submit(&self, raw: &str, source: EntrySource) -> AppResult<IntakeOutcome> {
        let Ok(email) = EmailAddress::parse(raw) else {
            debug!("Rejected malformed email");
            return Ok(IntakeOutcome::Rejected(Rejection::InvalidEmail));
        };

        if self.repo.find_by_email(&email).await?.is_some() {
            info!(email = %email, "Email already on the waitlist");
            return Ok(IntakeOutcome::AlreadyExists);
        }

        if source.requires_verification() {
            let verdict = self.run_verifier(&email).await;
            if !verdict.valid {
                info!(email = %email, reason = ?verdict.reason, "Email failed verification");
                return Ok(IntakeOutcome::Rejected(Rejection::Undeliverable));
            }
        }

        // Past this point the verifier passed the address or the identity
        // provider already vouched for it.
        let new_entry = NewWaitlistEntry {
            email: email.clone(),
            source,
            verified: true,
        };
        let entry = match self.repo.insert(new_entry).await {
            Ok(entry) => entry,
            Err(AppError::Conflict) => {
                info!(email = %email, "Lost insert race, treating as existing entry");
                return Ok(IntakeOutcome::AlreadyExists);
            }
            Err(err) => return Err(err),
        };

        info!(email = %entry.email, entry_id = %entry.id, "Joined the waitlist");
        self.send_welcome(&entry).await;

        Ok(IntakeOutcome::Created(entry))
    }

    /// Validates and runs the verifier without touching the store.
    #[instrument(skip(self, raw))]
    pub async fn check_deliverability(&self, raw: &str) -> AppResult<DeliverabilityReport> {
        let email = EmailAddress::parse(raw).map_err(|_| Rejection::InvalidEmail)?;
        let verdict = self.run_verifier(&email).await;
        let reason = match (&verdict.reason, verdict.valid) {
            (Some(reason), _) => reason.clone(),
            (None, true) => "Email verified successfully".to_string(),
            (None, false) => "Email does not exist".to_string(),
        };
        Ok(DeliverabilityReport {
            email,
            is_valid: verdict.valid,
            reason,
        })
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repo.count().await
    }

    pub async fn store_healthy(&self) -> bool {
        tokio::time::timeout(STORE_PING_TIMEOUT, self.repo.ping())
            .await
            .unwrap_or(false)
    }

    /// One bounded attempt; every failure collapses into an invalid verdict.
    async fn run_verifier(&self, email: &EmailAddress) -> Verdict {
        let verifier = self.verifier.name();
        match tokio::time::timeout(self.verify_timeout, self.verifier.verify(email)).await {
            Ok(Ok(verdict)) => {
                debug!(email = %email, verifier, valid = verdict.valid, "Verification finished");
                verdict
            }
            Ok(Err(err)) => {
                warn!(email = %email, verifier, error = %err, "Verification failed");
                Verdict::invalid(err.to_string())
            }
            Err(_) => {
                let err = VerifierError::Timeout(self.verify_timeout);
                warn!(email = %email, verifier, error = %err, "Verification timed out");
                Verdict::invalid(err.to_string())
            }
        }
    }

    async fn send_welcome(&self, entry: &WaitlistEntry) {
        let Some(sender) = &self.email else {
            return;
        };
        let (subject, html) = email_templates::welcome_email(&self.product_name, &self.app_origin);
        if let Err(err) = sender.send(entry.email.as_str(), &subject, &html).await {
            let err = AppError::Notification(err.to_string());
            error!(email = %entry.email, error = %err, "Welcome email not sent");
        }
    }
}
