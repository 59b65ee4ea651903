//! API models for payment endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::ParticipantId;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// The enrollment the checkout pays for
    #[schema(value_type = Uuid)]
    pub participant_id: ParticipantId,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// Provider-hosted checkout page to redirect the student to
    pub url: String,
}
