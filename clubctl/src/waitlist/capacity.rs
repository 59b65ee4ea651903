//! Capacity checking sweep.
//!
//! Computes free spots per active class and hands classes with openings to
//! the notifier, de-duplicated against recently minted tokens. One class
//! failing never aborts the sweep; the error is logged and the sweep moves
//! on to the next class.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use tracing::instrument;
use utoipa::ToSchema;

use crate::{
    config::Config,
    db::{
        handlers::{classes, EnrollmentTokens, Participants, Waitlist},
        models::classes::ProgrammedClass,
    },
    errors::Error,
    waitlist::Notifier,
};

/// Outcome of one sweep, returned to the manual trigger endpoint.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct SweepSummary {
    /// Active classes examined
    pub classes_checked: usize,
    /// Notifications pushed out
    pub notifications_sent: usize,
    /// Notified entries lapsed to skipped because their window passed
    pub offers_lapsed: u64,
    /// Classes skipped because a token was minted within the cooldown
    pub cooldown_suppressed: usize,
}

#[derive(Clone)]
pub struct CapacityChecker {
    pool: PgPool,
    notifier: Notifier,
    renotify_cooldown: Duration,
}

impl CapacityChecker {
    pub fn new(pool: PgPool, notifier: Notifier, config: &Config) -> Self {
        Self {
            pool,
            notifier,
            renotify_cooldown: config.waitlist.renotify_cooldown,
        }
    }

    /// Run one full sweep over all active classes.
    #[instrument(skip(self), err)]
    pub async fn sweep(&self) -> Result<SweepSummary, Error> {
        let mut summary = SweepSummary::default();

        // First lapse expired offers so their spots count as free below.
        {
            let mut conn = self.pool.acquire().await.map_err(crate::db::errors::DbError::from)?;
            summary.offers_lapsed = Waitlist::new(&mut conn).lapse_expired(Utc::now()).await?;
            if summary.offers_lapsed > 0 {
                tracing::info!(count = summary.offers_lapsed, "Lapsed expired spot offers");
            }
        }

        let active_classes = classes::list_active(&self.pool).await?;
        summary.classes_checked = active_classes.len();

        for class in active_classes {
            match self.check_class(&class).await {
                Ok(ClassOutcome::Notified) => summary.notifications_sent += 1,
                Ok(ClassOutcome::CooldownSuppressed) => summary.cooldown_suppressed += 1,
                Ok(ClassOutcome::NoFreeSpots) => {}
                Err(e) => {
                    tracing::warn!(class = %class.name, error = %e, "Skipping class after sweep error");
                }
            }
        }

        Ok(summary)
    }

    /// Check one class and notify when it has free spots.
    async fn check_class(&self, class: &ProgrammedClass) -> Result<ClassOutcome, Error> {
        let mut conn = self.pool.acquire().await.map_err(crate::db::errors::DbError::from)?;

        let active = Participants::new(&mut conn).count_active(class.id).await?;
        let available = class.max_participants as i64 - active;
        if available <= 0 {
            return Ok(ClassOutcome::NoFreeSpots);
        }

        // De-duplication: a token minted within the cooldown means this
        // class was already announced recently.
        if let Some(token) = EnrollmentTokens::new(&mut conn).latest_for_class(class.id).await? {
            let cooldown = chrono::Duration::from_std(self.renotify_cooldown).unwrap_or(chrono::Duration::hours(2));
            if Utc::now() - token.created_at < cooldown {
                tracing::debug!(class = %class.name, "Notification suppressed by cooldown");
                return Ok(ClassOutcome::CooldownSuppressed);
            }
        }

        drop(conn);

        self.notifier.notify(class.id, available as i32).await?;
        Ok(ClassOutcome::Notified)
    }
}

enum ClassOutcome {
    Notified,
    CooldownSuppressed,
    NoFreeSpots,
}
