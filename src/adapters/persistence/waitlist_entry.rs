use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::{
        email_address::EmailAddress,
        entities::waitlist_entry::{EntrySource, NewWaitlistEntry, WaitlistEntry},
    },
    use_cases::intake::WaitlistRepo,
};

// Waitlist entry as stored in the db.
#[derive(sqlx::FromRow, Debug)]
pub struct WaitlistEntryDb {
    pub id: Uuid,
    pub email: String,
    pub source: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<WaitlistEntryDb> for WaitlistEntry {
    fn from(row: WaitlistEntryDb) -> Self {
        WaitlistEntry {
            id: row.id,
            email: EmailAddress::from_stored(row.email),
            source: EntrySource::from_db(&row.source),
            verified: row.verified,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl WaitlistRepo for PostgresPersistence {
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<WaitlistEntry>> {
        let row = sqlx::query_as::<_, WaitlistEntryDb>(
            "SELECT id, email, source, verified, created_at FROM waitlist_entries WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(WaitlistEntry::from))
    }

    async fn insert(&self, entry: NewWaitlistEntry) -> AppResult<WaitlistEntry> {
        // A concurrent insert of the same email trips the unique index and
        // surfaces as AppError::Conflict.
        let row = sqlx::query_as::<_, WaitlistEntryDb>(
            r#"
                INSERT INTO waitlist_entries (id, email, source, verified)
                VALUES ($1, $2, $3, $4)
                RETURNING id, email, source, verified, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.email.as_str())
        .bind(entry.source.as_str())
        .bind(entry.verified)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.into())
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM waitlist_entries")
            .fetch_one(self.pool())
            .await
            .map_err(AppError::from)?;
        Ok(count)
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(self.pool()).await.is_ok()
    }
}
