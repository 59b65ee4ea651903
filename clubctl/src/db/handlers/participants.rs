//! Database repository for class participants, including the capacity claim.
//!
//! Every path that adds an active participant goes through [`claim_spot`]:
//! a row lock on the class, a re-count, and the insert run in one
//! transaction, so the capacity invariant (active participants never exceed
//! `max_participants`) holds even under concurrent claims.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::Classes,
        models::{participants::ClassParticipant, EntityStatus},
    },
    errors::Error,
    types::{abbrev_uuid, ClassId, ParticipantId, StudentId},
};

pub struct Participants<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Participants<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: ParticipantId) -> Result<Option<ClassParticipant>> {
        let participant = sqlx::query_as::<_, ClassParticipant>("SELECT * FROM class_participants WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(participant)
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_class(&mut self, class_id: ClassId) -> Result<Vec<ClassParticipant>> {
        let participants = sqlx::query_as::<_, ClassParticipant>("SELECT * FROM class_participants WHERE class_id = $1 ORDER BY joined_at")
            .bind(class_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(participants)
    }

    /// Count active participants; this is what capacity is measured against.
    #[instrument(skip(self), err)]
    pub async fn count_active(&mut self, class_id: ClassId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM class_participants WHERE class_id = $1 AND status = 'active'")
            .bind(class_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    /// Insert an active participant row. Callers must hold the class row
    /// lock (see [`Classes::lock_for_update`]) and have re-checked capacity.
    #[instrument(skip(self), err)]
    pub async fn insert_active(&mut self, class_id: ClassId, student_id: StudentId) -> Result<ClassParticipant> {
        let participant = sqlx::query_as::<_, ClassParticipant>(
            r#"
            INSERT INTO class_participants (class_id, student_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(class_id)
        .bind(student_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(participant)
    }

    /// Cancel an active participant. The freed spot is picked up by the
    /// next capacity sweep.
    #[instrument(skip(self), fields(participant_id = %abbrev_uuid(&id)), err)]
    pub async fn cancel(&mut self, id: ParticipantId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE class_participants
            SET status = 'cancelled', cancelled_at = $2
            WHERE id = $1 AND status = 'active'
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark the participant's enrollment as paid.
    #[instrument(skip(self), fields(participant_id = %abbrev_uuid(&id)), err)]
    pub async fn mark_paid(&mut self, id: ParticipantId) -> Result<bool> {
        let result = sqlx::query("UPDATE class_participants SET payment_status = 'paid' WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Atomically claim a spot in a class for a student.
///
/// Locks the class row, re-counts active participants under the lock, and
/// inserts only when capacity remains. Returns `Conflict` when the class is
/// full and `NotFound` for unknown or archived classes.
#[instrument(skip(pool), err)]
pub async fn claim_spot(pool: &PgPool, class_id: ClassId, student_id: StudentId) -> std::result::Result<ClassParticipant, Error> {
    let mut tx = pool.begin().await.map_err(crate::db::errors::DbError::from)?;

    let class = Classes::new(&mut tx)
        .lock_for_update(class_id)
        .await?
        .filter(|c| c.status == EntityStatus::Active)
        .ok_or_else(|| Error::NotFound {
            resource: "Class".to_string(),
            id: class_id.to_string(),
        })?;

    let mut participants = Participants::new(&mut tx);
    let active = participants.count_active(class_id).await?;
    if active >= class.max_participants as i64 {
        return Err(Error::Conflict {
            message: "Class is full".to_string(),
        });
    }

    let participant = participants.insert_active(class_id, student_id).await?;

    tx.commit().await.map_err(crate::db::errors::DbError::from)?;

    Ok(participant)
}
