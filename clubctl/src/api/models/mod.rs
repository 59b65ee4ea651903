//! Request and response types for the management API.

pub mod classes;
pub mod clubs;
pub mod leagues;
pub mod pagination;
pub mod payments;
pub mod students;
pub mod trainers;
pub mod waitlist;
