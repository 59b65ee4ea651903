//! Database repository for staff API keys.

use chrono::Utc;
use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        models::staff_keys::{StaffKey, StaffKeyCreateDBRequest},
    },
    types::{abbrev_uuid, StaffKeyId},
};

pub struct StaffKeys<'c> {
    db: &'c mut PgConnection,
}

impl<'c> StaffKeys<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    pub async fn create(&mut self, request: &StaffKeyCreateDBRequest) -> Result<StaffKey> {
        let key = sqlx::query_as::<_, StaffKey>(
            r#"
            INSERT INTO staff_keys (club_id, name, secret)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(request.club_id)
        .bind(&request.name)
        .bind(&request.secret)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(key)
    }

    /// Find an unrevoked key by its secret. This is the auth lookup path.
    #[instrument(skip_all, err)]
    pub async fn find_by_secret(&mut self, secret: &str) -> Result<Option<StaffKey>> {
        let key = sqlx::query_as::<_, StaffKey>("SELECT * FROM staff_keys WHERE secret = $1 AND revoked_at IS NULL")
            .bind(secret)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(key)
    }

    #[instrument(skip(self), fields(key_id = %abbrev_uuid(&id)), err)]
    pub async fn revoke(&mut self, id: StaffKeyId) -> Result<bool> {
        let result = sqlx::query("UPDATE staff_keys SET revoked_at = $2 WHERE id = $1 AND revoked_at IS NULL")
            .bind(id)
            .bind(Utc::now())
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
