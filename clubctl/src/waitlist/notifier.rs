//! Spot-offer notifier.
//!
//! Given a class with free spots, the notifier mints an enrollment token,
//! promotes the next waiting student to `notified`, formats the offer
//! message, and pushes it to the club's group chat. The external send has
//! no retry: a failure propagates to the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use utoipa::ToSchema;

use crate::{
    config::Config,
    db::{
        handlers::{Classes, Clubs, EnrollmentTokens, Repository, Waitlist},
        models::{classes::ProgrammedClass, clubs::Club, waitlist::WaitlistEntry, EntityStatus},
    },
    errors::Error,
    messaging::MessagingProvider,
    types::{abbrev_uuid, ClassId},
};

/// Result of a successful notification.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotifyOutcome {
    /// The message that was pushed to the group chat
    pub message: String,
    /// Deep link embedded in the message
    pub enrollment_url: String,
    /// When the offer stops being claimable
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Notifier {
    pool: PgPool,
    messaging: Arc<dyn MessagingProvider>,
    public_url: String,
    offer_window: Duration,
}

impl Notifier {
    pub fn new(pool: PgPool, messaging: Arc<dyn MessagingProvider>, config: &Config) -> Self {
        Self {
            pool,
            messaging,
            public_url: config.public_url.clone(),
            offer_window: config.waitlist.offer_window,
        }
    }

    /// Notify the group chat that `available_spots` opened up in a class.
    ///
    /// Fails with `NotFound` for unknown or archived classes and propagates
    /// messaging failures.
    #[instrument(skip(self), fields(class_id = %abbrev_uuid(&class_id)), err)]
    pub async fn notify(&self, class_id: ClassId, available_spots: i32) -> Result<NotifyOutcome, Error> {
        let mut conn = self.pool.acquire().await.map_err(crate::db::errors::DbError::from)?;

        let class = Classes::new(&mut conn)
            .get_by_id(class_id)
            .await?
            .filter(|c| c.status == EntityStatus::Active)
            .ok_or_else(|| Error::NotFound {
                resource: "Class".to_string(),
                id: class_id.to_string(),
            })?;

        let club = Clubs::new(&mut conn).get_by_id(class.club_id).await?.ok_or_else(|| Error::NotFound {
            resource: "Club".to_string(),
            id: class.club_id.to_string(),
        })?;

        let expires_at = Utc::now() + chrono::Duration::from_std(self.offer_window).unwrap_or(chrono::Duration::hours(24));

        let token = EnrollmentTokens::new(&mut conn)
            .create_for_class(class_id, available_spots, expires_at)
            .await?;

        // Head of the queue gets the offer; with nobody waiting the message
        // still goes out and links to the class page instead.
        let entry = Waitlist::new(&mut conn).promote_next(class_id, expires_at, token.id).await?;

        let enrollment_url = match &entry {
            Some(entry) => format!("{}/confirm-waitlist?entry={}", self.public_url, entry.id),
            None => format!("{}/classes/{}", self.public_url, class.id),
        };

        let message = build_offer_message(&class, &club, available_spots, entry.as_ref(), &enrollment_url, expires_at);

        drop(conn);

        self.messaging
            .send_group_message(&message, club.whatsapp_group_id.as_deref())
            .await
            .map_err(|e| Error::Internal {
                operation: format!("send waitlist notification: {e}"),
            })?;

        tracing::info!(
            class = %class.name,
            spots = available_spots,
            promoted = entry.is_some(),
            "Sent spot offer"
        );

        Ok(NotifyOutcome {
            message,
            enrollment_url,
            expires_at,
        })
    }
}

/// Fixed offer template: class, club, schedule, spot count, link, deadline.
fn build_offer_message(
    class: &ProgrammedClass,
    club: &Club,
    available_spots: i32,
    entry: Option<&WaitlistEntry>,
    enrollment_url: &str,
    expires_at: DateTime<Utc>,
) -> String {
    let spots_line = if available_spots == 1 {
        "1 spot just opened".to_string()
    } else {
        format!("{available_spots} spots just opened")
    };

    let action_line = match entry {
        Some(_) => format!(
            "Confirm: {enrollment_url}&action=confirm\nCan't make it? {enrollment_url}&action=decline"
        ),
        None => format!("Join the class: {enrollment_url}"),
    };

    format!(
        "{spots_line} in {class_name} at {club_name}!\n\
         Schedule: {weekday} {start_time}\n\
         {action_line}\n\
         Offer valid until {expires}",
        class_name = class.name,
        club_name = club.name,
        weekday = class.weekday_name(),
        start_time = class.start_time.format("%H:%M"),
        expires = expires_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};
    use uuid::Uuid;

    fn test_class() -> ProgrammedClass {
        ProgrammedClass {
            id: Uuid::from_u128(1),
            club_id: Uuid::from_u128(2),
            trainer_id: None,
            name: "Intermediate Padel".to_string(),
            max_participants: 8,
            day_of_week: 0,
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            duration_minutes: 60,
            level: None,
            status: EntityStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_club() -> Club {
        Club {
            id: Uuid::from_u128(2),
            name: "Club Norte".to_string(),
            slug: "club-norte".to_string(),
            whatsapp_group_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_message_contains_class_and_spot_count() {
        let expires = Utc.with_ymd_and_hms(2026, 8, 8, 18, 0, 0).unwrap();
        let message = build_offer_message(&test_class(), &test_club(), 1, None, "https://x/classes/1", expires);

        assert!(message.contains("1 spot just opened"));
        assert!(message.contains("Intermediate Padel"));
        assert!(message.contains("Club Norte"));
        assert!(message.contains("Monday 18:00"));
        assert!(message.contains("2026-08-08"));
    }

    #[test]
    fn test_message_pluralizes_and_links_actions_for_promoted_entry() {
        let entry = WaitlistEntry {
            id: Uuid::from_u128(9),
            class_id: Uuid::from_u128(1),
            student_id: Uuid::from_u128(3),
            status: crate::db::models::waitlist::WaitlistStatus::Notified,
            position: 1,
            joined_at: Utc::now(),
            notified_at: Some(Utc::now()),
            expires_at: Some(Utc::now()),
            token_id: None,
        };
        let message = build_offer_message(
            &test_class(),
            &test_club(),
            3,
            Some(&entry),
            "https://x/confirm-waitlist?entry=9",
            Utc::now(),
        );

        assert!(message.contains("3 spots just opened"));
        assert!(message.contains("action=confirm"));
        assert!(message.contains("action=decline"));
    }
}
