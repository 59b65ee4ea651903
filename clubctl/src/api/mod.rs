//! HTTP API layer.
//!
//! Two surfaces:
//!
//! - The staff management API under `/api/v1` (bearer staff keys), JSON in
//!   and out.
//! - Browser-facing endpoints at the root: the waitlist confirmation page
//!   and the payment webhook sink.

pub mod handlers;
pub mod models;
