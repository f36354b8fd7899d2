pub mod user;

pub use user::{
    CreateUserDto, GetUserDto, RandomUserSource, UpdateUserDto, User, UserPageQuery,
    UserRepositoryInterface,
};

pub use crate::shared::{DomainError, SourceError};

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
