//! API models for the waitlist endpoints.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::types::StudentId;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct JoinWaitlistRequest {
    #[schema(value_type = Uuid)]
    pub student_id: StudentId,
}
