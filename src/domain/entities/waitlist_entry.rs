use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::email_address::EmailAddress;

/// Which intake path produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// Typed into the landing page form.
    Form,
    /// Taken from a Google sign-in; the identity provider already vouched
    /// for the address.
    Google,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::Form => "form",
            EntrySource::Google => "google",
        }
    }

    /// Reads the stored `source` column. Unknown values fall back to `Form`.
    pub fn from_db(s: &str) -> Self {
        match s {
            "google" => EntrySource::Google,
            "form" => EntrySource::Form,
            other => {
                tracing::warn!(source = other, "Unknown entry source in store, reading as form");
                EntrySource::Form
            }
        }
    }

    pub fn requires_verification(&self) -> bool {
        matches!(self, EntrySource::Form)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub email: EmailAddress,
    pub source: EntrySource,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Entry as handed to the store; id and timestamp are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewWaitlistEntry {
    pub email: EmailAddress,
    pub source: EntrySource,
    pub verified: bool,
}
