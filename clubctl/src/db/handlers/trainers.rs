//! Database repository for trainers.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::trainers::{Trainer, TrainerCreateDBRequest, TrainerDBResponse, TrainerFilter, TrainerUpdateDBRequest},
    },
    types::TrainerId,
};

pub struct Trainers<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Trainers<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Archive instead of deleting; history referencing the trainer stays intact.
    #[instrument(skip(self), err)]
    pub async fn archive(&mut self, id: TrainerId) -> Result<bool> {
        let result = sqlx::query("UPDATE trainers SET status = 'archived', updated_at = NOW() WHERE id = $1 AND status = 'active'")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Trainers<'c> {
    type CreateRequest = TrainerCreateDBRequest;
    type UpdateRequest = TrainerUpdateDBRequest;
    type Response = TrainerDBResponse;
    type Id = TrainerId;
    type Filter = TrainerFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let trainer = sqlx::query_as::<_, Trainer>(
            r#"
            INSERT INTO trainers (club_id, name, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.club_id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(trainer)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let trainer = sqlx::query_as::<_, Trainer>("SELECT * FROM trainers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(trainer)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let trainers = sqlx::query_as::<_, Trainer>("SELECT * FROM trainers WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(trainers.into_iter().map(|t| (t.id, t)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let trainers = sqlx::query_as::<_, Trainer>(
            r#"
            SELECT * FROM trainers
            WHERE club_id = $1 AND ($2::entity_status IS NULL OR status = $2)
            ORDER BY name
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.club_id)
        .bind(filter.status)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(trainers)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let trainer = sqlx::query_as::<_, Trainer>(
            r#"
            UPDATE trainers
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(trainer)
    }

    /// Soft delete: trainers are archived, never removed.
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        self.archive(id).await
    }
}
