//! Authentication and authorization.
//!
//! The management API authenticates with bearer staff keys:
//!
//! - Keys are created per club (or as platform keys, with no club) and
//!   passed in `Authorization: Bearer <key>` headers.
//! - Keys have no expiration; they are revoked when no longer needed.
//!
//! Authorization is club scoping rather than a role matrix: a club key can
//! only touch its own club's resources, while a platform key manages clubs
//! and keys but does not operate inside a club.
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use clubctl::auth::CurrentStaff;
//!
//! async fn protected_handler(staff: CurrentStaff) -> Result<String, Error> {
//!     let club_id = staff.require_club()?;
//!     Ok(format!("Operating on club {club_id}"))
//! }
//! ```

pub mod current_staff;

pub use current_staff::CurrentStaff;
