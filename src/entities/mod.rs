//! Entities module - Domain entities
//!
//! Every entity maps to a table in the database. `Dinner` and `Rsvp` carry an
//! [`ObjectState`] that tells the repository which write to perform on save.

pub mod dinner;
pub mod enums;
pub mod rsvp;
pub mod user;

// Re-exports
pub use dinner::Dinner;
pub use enums::ObjectState;
pub use rsvp::Rsvp;
pub use user::User;
