//! User aggregate
//!
//! Contains the User entity, DTOs, the repository interface and the
//! random-user source port.

pub mod model;
pub mod repository;
pub mod source;

mod dto_create;
mod dto_get;
mod dto_update;

#[cfg(test)]
pub mod fixtures;

// Re-export model types
pub use model::{search_key, User};

// Re-export DTOs
pub use dto_create::CreateUserDto;
pub use dto_get::{GetUserDto, UserPageQuery};
pub use dto_update::UpdateUserDto;

// Re-export ports
pub use repository::UserRepositoryInterface;
pub use source::RandomUserSource;
