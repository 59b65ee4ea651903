//! Database repository for enrollment tokens.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    crypto,
    db::{
        errors::Result,
        models::enrollment_tokens::{EnrollmentToken, EnrollmentTokenCreateDBRequest},
    },
    types::{abbrev_uuid, ClassId, EnrollmentTokenId},
};

pub struct EnrollmentTokens<'c> {
    db: &'c mut PgConnection,
}

impl<'c> EnrollmentTokens<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), err)]
    pub async fn create(&mut self, request: &EnrollmentTokenCreateDBRequest) -> Result<EnrollmentToken> {
        let token = sqlx::query_as::<_, EnrollmentToken>(
            r#"
            INSERT INTO enrollment_tokens (class_id, secret, available_spots, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.class_id)
        .bind(&request.secret)
        .bind(request.available_spots)
        .bind(request.expires_at)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(token)
    }

    /// Mint a token for a class with a freshly generated secret.
    #[instrument(skip(self), fields(class_id = %abbrev_uuid(&class_id)), err)]
    pub async fn create_for_class(
        &mut self,
        class_id: ClassId,
        available_spots: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<EnrollmentToken> {
        let request = EnrollmentTokenCreateDBRequest {
            class_id,
            secret: crypto::generate_enrollment_token(),
            available_spots,
            expires_at,
        };

        self.create(&request).await
    }

    /// Newest token for a class. The capacity sweep uses this as its
    /// re-notification de-duplication probe.
    #[instrument(skip(self), fields(class_id = %abbrev_uuid(&class_id)), err)]
    pub async fn latest_for_class(&mut self, class_id: ClassId) -> Result<Option<EnrollmentToken>> {
        let token = sqlx::query_as::<_, EnrollmentToken>(
            "SELECT * FROM enrollment_tokens WHERE class_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(class_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(token)
    }

    /// Consume a token. Single-use: only unclaimed tokens are affected.
    #[instrument(skip(self), fields(token_id = %abbrev_uuid(&id)), err)]
    pub async fn mark_claimed(&mut self, id: EnrollmentTokenId) -> Result<bool> {
        let result = sqlx::query("UPDATE enrollment_tokens SET claimed_at = NOW() WHERE id = $1 AND claimed_at IS NULL")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
