use async_trait::async_trait;

use super::{CreateUserDto, UpdateUserDto, User, UserPageQuery};
use crate::domain::DomainResult;
use crate::shared::PaginatedResult;

/// Persistence port for the user aggregate.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    async fn insert_one(&self, dto: CreateUserDto) -> DomainResult<User>;
    /// Persists all records in a single store operation and returns how many
    /// rows were written.
    async fn insert_many(&self, dtos: Vec<CreateUserDto>) -> DomainResult<u64>;

    async fn get_by_id(&self, id: i32) -> DomainResult<Option<User>>;
    async fn update(&self, id: i32, dto: UpdateUserDto) -> DomainResult<Option<User>>;
    /// Returns `false` when no user with `id` existed.
    async fn delete(&self, id: i32) -> DomainResult<bool>;

    async fn count(&self) -> DomainResult<u64>;
    async fn exists(&self, id: i32) -> DomainResult<bool>;
    async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> DomainResult<bool>;

    /// Filtered page ordered newest first (`created_at DESC, id DESC`).
    async fn query_page(&self, query: &UserPageQuery) -> DomainResult<PaginatedResult<User>>;
}
