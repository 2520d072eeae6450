//! DTOs module - Data Transfer Objects
//!
//! Shapes exchanged with HTTP clients, kept apart from the entities that
//! repositories persist.

pub mod dinner;
pub mod query;
pub mod user;

pub use dinner::{
    DinnerDTO, DinnerDeletedDTO, DinnerFormDTO, FormRedisplayDTO, JsonDinnerDTO, PagedDinnersDTO,
    RsvpDTO, WebSliceDTO,
};
pub use query::{DinnerIndexQuery, LocationSearchDTO, PopularQuery};
pub use user::{
    ChangePasswordDTO, CreateUserDTO, LogOnDTO, LogOnResponseDTO, RegisterDTO, UpdateUserDTO,
    UserDTO,
};
