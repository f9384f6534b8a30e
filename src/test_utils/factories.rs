//! Test data factories.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    email_address::EmailAddress,
    entities::waitlist_entry::{EntrySource, WaitlistEntry},
};

/// Create a stored waitlist entry with sensible defaults, then apply `customize`.
pub fn create_test_entry(customize: impl FnOnce(&mut WaitlistEntry)) -> WaitlistEntry {
    let mut entry = WaitlistEntry {
        id: Uuid::new_v4(),
        email: EmailAddress::from_stored(format!("user-{}@example.com", Uuid::new_v4().simple())),
        source: EntrySource::Form,
        verified: true,
        created_at: Utc::now(),
    };
    customize(&mut entry);
    entry
}
