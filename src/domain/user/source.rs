use async_trait::async_trait;

use super::CreateUserDto;
use crate::shared::SourceError;

/// External generator of randomized person records.
#[async_trait]
pub trait RandomUserSource: Send + Sync {
    /// Fetches up to `count` records, already mapped into new users.
    /// The source may under-deliver; an empty result is not an error here.
    async fn fetch_random_users(&self, count: usize) -> Result<Vec<CreateUserDto>, SourceError>;
}
