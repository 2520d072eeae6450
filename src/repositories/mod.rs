//! Repositories module - database access for every entity
//!
//! Queries are built at runtime with `sqlx::query_as` and `sqlx::QueryBuilder`,
//! so the crate compiles without a live database. Every value reaches SQL
//! through a bind parameter; sort columns come from the closed
//! [`DinnerOrder`] enum.

pub mod dinner;
pub mod paging;
pub mod query;
pub mod traits;
pub mod user;

// Re-exports
pub use traits::{Create, Delete, Read, Save, Update};

pub use dinner::DinnerRepository;
pub use paging::{PageRequest, PagedList};
pub use query::{DinnerFilter, DinnerOrder};
pub use user::UserRepository;
