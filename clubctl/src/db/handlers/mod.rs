//! Repository implementations for CRUD operations.

pub mod classes;
pub mod clubs;
pub mod enrollment_tokens;
pub mod leagues;
pub mod participants;
pub mod payments;
pub mod repository;
pub mod staff_keys;
pub mod students;
pub mod trainers;
pub mod waitlist;

pub use classes::Classes;
pub use clubs::Clubs;
pub use enrollment_tokens::EnrollmentTokens;
pub use leagues::Leagues;
pub use participants::Participants;
pub use payments::Payments;
pub use repository::Repository;
pub use staff_keys::StaffKeys;
pub use students::Students;
pub use trainers::Trainers;
pub use waitlist::Waitlist;
