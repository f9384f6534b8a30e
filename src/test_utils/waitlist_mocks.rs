//! In-memory mock implementations of the intake ports.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::email_verifier::{EmailVerifier, Verdict, VerifierError},
        use_cases::intake::{EmailSender, WaitlistRepo},
    },
    domain::{
        email_address::EmailAddress,
        entities::waitlist_entry::{NewWaitlistEntry, WaitlistEntry},
    },
    infra::rate_limit::RateLimiterTrait,
};

// ============================================================================
// InMemoryWaitlistRepo
// ============================================================================

/// In-memory implementation of WaitlistRepo with a unique key on email.
#[derive(Default)]
pub struct InMemoryWaitlistRepo {
    pub entries: Mutex<HashMap<String, WaitlistEntry>>,
    lookups: AtomicUsize,
    fail_writes: bool,
    unreachable: bool,
}

impl InMemoryWaitlistRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with existing entries.
    pub fn with_entries(entries: Vec<WaitlistEntry>) -> Self {
        let map = entries
            .into_iter()
            .map(|e| (e.email.as_str().to_string(), e))
            .collect();
        Self {
            entries: Mutex::new(map),
            ..Self::default()
        }
    }

    /// Every insert fails with a non-conflict database error.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Every call fails as if the store were down.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Get all entries (for test assertions).
    pub fn get_all(&self) -> Vec<WaitlistEntry> {
        self.entries.lock().unwrap().values().cloned().collect()
    }

    /// Number of existence checks performed.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WaitlistRepo for InMemoryWaitlistRepo {
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<WaitlistEntry>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(AppError::Database("store unreachable".into()));
        }
        Ok(self.entries.lock().unwrap().get(email.as_str()).cloned())
    }

    async fn insert(&self, entry: NewWaitlistEntry) -> AppResult<WaitlistEntry> {
        if self.fail_writes || self.unreachable {
            return Err(AppError::Database("write failed".into()));
        }
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(entry.email.as_str()) {
            return Err(AppError::Conflict);
        }
        let stored = WaitlistEntry {
            id: Uuid::new_v4(),
            email: entry.email,
            source: entry.source,
            verified: entry.verified,
            created_at: Utc::now(),
        };
        entries.insert(stored.email.as_str().to_string(), stored.clone());
        Ok(stored)
    }

    async fn count(&self) -> AppResult<i64> {
        if self.unreachable {
            return Err(AppError::Database("store unreachable".into()));
        }
        Ok(self.entries.lock().unwrap().len() as i64)
    }

    async fn ping(&self) -> bool {
        !self.unreachable
    }
}

// ============================================================================
// StubEmailVerifier
// ============================================================================

enum StubBehavior {
    Answer(Verdict),
    Fail(VerifierError),
    Hang(Duration),
}

/// Verifier with a canned answer that records how often it was called.
pub struct StubEmailVerifier {
    behavior: StubBehavior,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubEmailVerifier {
    fn with_behavior(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn valid() -> Self {
        Self::with_behavior(StubBehavior::Answer(Verdict::valid()))
    }

    pub fn invalid(reason: &str) -> Self {
        Self::with_behavior(StubBehavior::Answer(Verdict::invalid(reason)))
    }

    pub fn failing(err: VerifierError) -> Self {
        Self::with_behavior(StubBehavior::Fail(err))
    }

    /// Never answers within any sane bound.
    pub fn hanging(duration: Duration) -> Self {
        Self::with_behavior(StubBehavior::Hang(duration))
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailVerifier for StubEmailVerifier {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn verify(&self, _email: &EmailAddress) -> Result<Verdict, VerifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behavior {
            StubBehavior::Answer(verdict) => Ok(verdict.clone()),
            StubBehavior::Fail(err) => Err(err.clone()),
            StubBehavior::Hang(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(Verdict::valid())
            }
        }
    }
}

// ============================================================================
// InMemoryEmailSender
// ============================================================================

#[derive(Clone, Debug)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Records outgoing mail instead of sending it.
#[derive(Default)]
pub struct InMemoryEmailSender {
    sent: Mutex<Vec<SentEmail>>,
    fail: bool,
}

impl InMemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails; nothing is recorded.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for InMemoryEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Internal("Email API error: 500".into()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}

// ============================================================================
// InMemoryRateLimiter
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum LimiterMode {
    Counting,
    Unavailable,
    Stalled,
}

/// In-memory rate limiter for testing.
/// Uses HashMap to track request counts per IP.
pub struct InMemoryRateLimiter {
    counts: Mutex<HashMap<String, u64>>,
    max_per_ip: u64,
    mode: LimiterMode,
}

impl InMemoryRateLimiter {
    pub fn new(max_per_ip: u64) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            max_per_ip,
            mode: LimiterMode::Counting,
        }
    }

    /// Behaves like an unreachable Redis: every check errors.
    pub fn unavailable() -> Self {
        Self {
            mode: LimiterMode::Unavailable,
            ..Self::new(0)
        }
    }

    /// Never answers.
    pub fn stalled() -> Self {
        Self {
            mode: LimiterMode::Stalled,
            ..Self::new(0)
        }
    }

    pub fn hits(&self) -> u64 {
        self.counts.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check(&self, ip: &str) -> AppResult<()> {
        match self.mode {
            LimiterMode::Counting => {}
            LimiterMode::Unavailable => {
                return Err(AppError::Internal("connection refused".into()));
            }
            LimiterMode::Stalled => std::future::pending::<()>().await,
        }
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(format!("rate:ip:{ip}")).or_insert(0);
        *count += 1;
        if *count > self.max_per_ip {
            return Err(AppError::RateLimited);
        }
        Ok(())
    }
}
