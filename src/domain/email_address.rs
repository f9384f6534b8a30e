use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::application::validators::is_valid_email;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("not a valid email address")]
pub struct InvalidEmailAddress;

/// A trimmed, lower-cased address that passed shape validation.
///
/// The normalized form is both the uniqueness key of the waitlist and the
/// value written to the store, so `" A@B.COM "` and `"a@b.com"` are the same
/// address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, InvalidEmailAddress> {
        let normalized = raw.trim().to_lowercase();
        if !is_valid_email(&normalized) {
            return Err(InvalidEmailAddress);
        }
        Ok(Self(normalized))
    }

    /// Rehydrates an address read back from the store, where it was written
    /// already normalized.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
