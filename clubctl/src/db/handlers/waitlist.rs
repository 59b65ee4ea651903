//! Database repository for waitlist entries.
//!
//! Transition guards live in the SQL: promotions and terminal transitions
//! carry a `WHERE status = ...` predicate, so an entry can never move
//! backwards no matter how requests interleave.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        models::waitlist::WaitlistEntry,
    },
    types::{abbrev_uuid, ClassId, EnrollmentTokenId, StudentId, WaitlistEntryId},
};

pub struct Waitlist<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Waitlist<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Add a student to the back of a class's waitlist.
    #[instrument(skip(self), err)]
    pub async fn join(&mut self, class_id: ClassId, student_id: StudentId) -> Result<WaitlistEntry> {
        let entry = sqlx::query_as::<_, WaitlistEntry>(
            r#"
            INSERT INTO waitlist_entries (class_id, student_id, position)
            VALUES ($1, $2, (SELECT COALESCE(MAX(position), 0) + 1 FROM waitlist_entries WHERE class_id = $1))
            RETURNING *
            "#,
        )
        .bind(class_id)
        .bind(student_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(entry)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: WaitlistEntryId) -> Result<Option<WaitlistEntry>> {
        let entry = sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(entry)
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_class(&mut self, class_id: ClassId) -> Result<Vec<WaitlistEntry>> {
        let entries = sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist_entries WHERE class_id = $1 ORDER BY position")
            .bind(class_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(entries)
    }

    /// Promote the head of the queue (lowest position still waiting) to
    /// `notified`, recording the offer deadline and token. Atomic: the
    /// subquery and update run as one statement, and `SKIP LOCKED` keeps
    /// two concurrent notifiers from promoting the same entry.
    ///
    /// Returns `None` when nobody is waiting.
    #[instrument(skip(self), err)]
    pub async fn promote_next(
        &mut self,
        class_id: ClassId,
        expires_at: DateTime<Utc>,
        token_id: EnrollmentTokenId,
    ) -> Result<Option<WaitlistEntry>> {
        let entry = sqlx::query_as::<_, WaitlistEntry>(
            r#"
            UPDATE waitlist_entries
            SET status = 'notified', notified_at = NOW(), expires_at = $2, token_id = $3
            WHERE id = (
                SELECT id FROM waitlist_entries
                WHERE class_id = $1 AND status = 'waiting'
                ORDER BY position
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
            "#,
        )
        .bind(class_id)
        .bind(expires_at)
        .bind(token_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(entry)
    }

    /// `notified -> accepted`. Returns `None` if the entry was not in the
    /// `notified` state (already terminal, or never offered a spot).
    #[instrument(skip(self), fields(entry_id = %abbrev_uuid(&id)), err)]
    pub async fn mark_accepted(&mut self, id: WaitlistEntryId) -> Result<Option<WaitlistEntry>> {
        let entry = sqlx::query_as::<_, WaitlistEntry>(
            "UPDATE waitlist_entries SET status = 'accepted' WHERE id = $1 AND status = 'notified' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(entry)
    }

    /// `notified -> skipped` (declined or timed out).
    #[instrument(skip(self), fields(entry_id = %abbrev_uuid(&id)), err)]
    pub async fn mark_skipped(&mut self, id: WaitlistEntryId) -> Result<Option<WaitlistEntry>> {
        let entry = sqlx::query_as::<_, WaitlistEntry>(
            "UPDATE waitlist_entries SET status = 'skipped' WHERE id = $1 AND status = 'notified' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(entry)
    }

    /// Lapse every notified entry whose offer window has passed. Returns
    /// the number of entries skipped.
    #[instrument(skip(self), err)]
    pub async fn lapse_expired(&mut self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("UPDATE waitlist_entries SET status = 'skipped' WHERE status = 'notified' AND expires_at < $1")
            .bind(now)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
