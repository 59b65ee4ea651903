//! HTTP request handlers for the management API and public endpoints.

pub mod classes;
pub mod clubs;
pub mod confirm;
pub mod leagues;
pub mod payments;
pub mod students;
pub mod trainers;
pub mod waitlist;
