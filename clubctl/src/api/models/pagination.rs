//! Shared pagination query parameters.

use serde::Deserialize;
use utoipa::IntoParams;

fn default_limit() -> i64 {
    50
}

/// `?skip=&limit=` query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(default)]
pub struct PaginationQuery {
    /// Rows to skip
    pub skip: i64,
    /// Maximum rows to return (capped at 500)
    pub limit: i64,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl PaginationQuery {
    /// Clamp to sane bounds before handing to the database.
    pub fn clamped(&self) -> (i64, i64) {
        let skip = self.skip.max(0);
        let limit = self.limit.clamp(1, 500);
        (skip, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        let q = PaginationQuery { skip: -5, limit: 10_000 };
        assert_eq!(q.clamped(), (0, 500));

        let q = PaginationQuery { skip: 20, limit: 0 };
        assert_eq!(q.clamped(), (20, 1));

        assert_eq!(PaginationQuery::default().clamped(), (0, 50));
    }
}
