//! Extractor for the authenticated staff key.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::instrument;

use crate::{
    db::handlers::StaffKeys,
    errors::{Error, Result},
    types::{ClubId, StaffKeyId},
    AppState,
};

/// The staff key a request was authenticated with.
#[derive(Debug, Clone)]
pub struct CurrentStaff {
    pub key_id: StaffKeyId,
    /// `None` for platform keys
    pub club_id: Option<ClubId>,
    pub name: String,
}

impl CurrentStaff {
    /// Whether this is a platform key (manages clubs and keys).
    pub fn is_platform(&self) -> bool {
        self.club_id.is_none()
    }

    /// Require a platform key; club keys are rejected.
    pub fn require_platform(&self) -> Result<()> {
        if self.is_platform() {
            Ok(())
        } else {
            Err(Error::Forbidden {
                resource: "platform administration".to_string(),
            })
        }
    }

    /// Require a club-scoped key and return its club.
    pub fn require_club(&self) -> Result<ClubId> {
        self.club_id.ok_or_else(|| Error::Forbidden {
            resource: "club resources (platform keys are not scoped to a club)".to_string(),
        })
    }
}

/// Extract the bearer secret from the Authorization header.
///
/// Returns:
/// - None: No Authorization header present
/// - Some(Ok(secret)): Bearer token found
/// - Some(Err(error)): Header present but malformed
fn bearer_secret(parts: &Parts) -> Option<Result<&str>> {
    let auth_header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }))
        }
    };

    match auth_str.strip_prefix("Bearer ") {
        Some(secret) => Some(Ok(secret)),
        None => Some(Err(Error::Unauthenticated {
            message: Some("Authorization header must use the Bearer scheme".to_string()),
        })),
    }
}

impl FromRequestParts<AppState> for CurrentStaff {
    type Rejection = Error;

    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let secret = match bearer_secret(parts) {
            Some(Ok(secret)) => secret,
            Some(Err(e)) => return Err(e),
            None => {
                return Err(Error::Unauthenticated { message: None });
            }
        };

        let mut conn = state.db.acquire().await.map_err(crate::db::errors::DbError::from)?;
        let key = StaffKeys::new(&mut conn)
            .find_by_secret(secret)
            .await?
            .ok_or_else(|| Error::Unauthenticated {
                message: Some("Invalid or revoked staff key".to_string()),
            })?;

        tracing::trace!(key = %key.name, "Authenticated staff key");

        Ok(CurrentStaff {
            key_id: key.id,
            club_id: key.club_id,
            name: key.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn staff(club_id: Option<ClubId>) -> CurrentStaff {
        CurrentStaff {
            key_id: Uuid::new_v4(),
            club_id,
            name: "test key".to_string(),
        }
    }

    #[test]
    fn test_platform_keys_are_not_club_scoped() {
        let platform = staff(None);
        assert!(platform.is_platform());
        assert!(platform.require_platform().is_ok());
        assert!(platform.require_club().is_err());
    }

    #[test]
    fn test_club_keys_cannot_administer_platform() {
        let club_id = Uuid::new_v4();
        let club_key = staff(Some(club_id));
        assert!(!club_key.is_platform());
        assert!(club_key.require_platform().is_err());
        assert_eq!(club_key.require_club().unwrap(), club_id);
    }
}
