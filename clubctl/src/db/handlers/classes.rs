//! Database repository for programmed classes.

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::classes::{ClassCreateDBRequest, ClassDBResponse, ClassFilter, ClassUpdateDBRequest, ProgrammedClass},
    },
    types::ClassId,
};

pub struct Classes<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Classes<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Lock the class row for the duration of the surrounding transaction.
    ///
    /// This is the serialization point for capacity claims: callers must
    /// hold this lock before counting participants and inserting. Only
    /// meaningful when the repository wraps a transaction connection.
    #[instrument(skip(self), err)]
    pub async fn lock_for_update(&mut self, id: ClassId) -> Result<Option<ProgrammedClass>> {
        let class = sqlx::query_as::<_, ProgrammedClass>("SELECT * FROM programmed_classes WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(class)
    }

    #[instrument(skip(self), err)]
    pub async fn archive(&mut self, id: ClassId) -> Result<bool> {
        let result =
            sqlx::query("UPDATE programmed_classes SET status = 'archived', updated_at = NOW() WHERE id = $1 AND status = 'active'")
                .bind(id)
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert a batch of generated slots in one transaction-friendly pass.
    #[instrument(skip(self, requests), fields(count = requests.len()), err)]
    pub async fn create_bulk(&mut self, requests: &[ClassCreateDBRequest]) -> Result<Vec<ProgrammedClass>> {
        let mut created = Vec::with_capacity(requests.len());
        for request in requests {
            created.push(self.create(request).await?);
        }
        Ok(created)
    }
}

/// List all active classes across clubs. Pool-level because the capacity
/// sweeper calls it outside any transaction.
#[instrument(skip(pool), err)]
pub async fn list_active(pool: &PgPool) -> Result<Vec<ProgrammedClass>> {
    let classes = sqlx::query_as::<_, ProgrammedClass>("SELECT * FROM programmed_classes WHERE status = 'active' ORDER BY created_at")
        .fetch_all(pool)
        .await?;

    Ok(classes)
}

#[async_trait::async_trait]
impl<'c> Repository for Classes<'c> {
    type CreateRequest = ClassCreateDBRequest;
    type UpdateRequest = ClassUpdateDBRequest;
    type Response = ClassDBResponse;
    type Id = ClassId;
    type Filter = ClassFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let class = sqlx::query_as::<_, ProgrammedClass>(
            r#"
            INSERT INTO programmed_classes
                (club_id, trainer_id, name, max_participants, day_of_week, start_time, duration_minutes, level)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(request.club_id)
        .bind(request.trainer_id)
        .bind(&request.name)
        .bind(request.max_participants)
        .bind(request.day_of_week)
        .bind(request.start_time)
        .bind(request.duration_minutes)
        .bind(&request.level)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(class)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let class = sqlx::query_as::<_, ProgrammedClass>("SELECT * FROM programmed_classes WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(class)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let classes = sqlx::query_as::<_, ProgrammedClass>("SELECT * FROM programmed_classes WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(classes.into_iter().map(|c| (c.id, c)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let classes = sqlx::query_as::<_, ProgrammedClass>(
            r#"
            SELECT * FROM programmed_classes
            WHERE club_id = $1 AND ($2::entity_status IS NULL OR status = $2)
            ORDER BY day_of_week, start_time
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.club_id)
        .bind(filter.status)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(classes)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let class = sqlx::query_as::<_, ProgrammedClass>(
            r#"
            UPDATE programmed_classes
            SET name = COALESCE($2, name),
                trainer_id = COALESCE($3, trainer_id),
                max_participants = COALESCE($4, max_participants),
                level = COALESCE($5, level),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.trainer_id)
        .bind(request.max_participants)
        .bind(&request.level)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(class)
    }

    /// Soft delete: classes are archived, never removed.
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        self.archive(id).await
    }
}
