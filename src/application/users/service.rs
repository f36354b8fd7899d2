//! User management service: application-layer orchestration

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, GetUserDto, UpdateUserDto, User,
    UserRepositoryInterface,
};
use crate::shared::PaginatedResult;

/// Upper bound on ids accepted by one bulk delete.
pub const MAX_BULK_DELETE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStats {
    pub total_users: u64,
    pub is_empty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteReport {
    pub deleted_count: u64,
    pub not_found_ids: Vec<i32>,
}

/// A bulk delete that stopped on a store failure. Deletes performed before
/// the failure are not rolled back.
#[derive(Debug, Error)]
#[error("bulk delete stopped after {deleted_count} deletions: {cause}")]
pub struct BulkDeleteError {
    pub deleted_count: u64,
    pub not_found_ids: Vec<i32>,
    #[source]
    pub cause: DomainError,
}

impl From<DomainError> for BulkDeleteError {
    fn from(cause: DomainError) -> Self {
        Self {
            deleted_count: 0,
            not_found_ids: Vec::new(),
            cause,
        }
    }
}

/// User service: orchestrates the CRUD use-cases.
///
/// Generic over `R: UserRepositoryInterface` so it stays decoupled from
/// the concrete persistence layer; `UserService<dyn UserRepositoryInterface>`
/// is what the HTTP layer holds.
pub struct UserService<R: UserRepositoryInterface + ?Sized> {
    repo: Arc<R>,
}

impl<R: UserRepositoryInterface + ?Sized> UserService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    // ── Queries ─────────────────────────────────────────────────

    /// List users with search and pagination, newest first.
    pub async fn list_users(&self, dto: GetUserDto) -> DomainResult<PaginatedResult<User>> {
        let query = dto.normalize();
        self.repo.query_page(&query).await
    }

    pub async fn get_user(&self, id: i32) -> DomainResult<User> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    pub async fn stats(&self) -> DomainResult<UserStats> {
        let total_users = self.repo.count().await?;
        Ok(UserStats {
            total_users,
            is_empty: total_users == 0,
        })
    }

    // ── Commands (mutations) ────────────────────────────────────

    pub async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        if self.repo.email_exists(&dto.email, None).await? {
            return Err(DomainError::Conflict("Email already registered".into()));
        }

        let user = self.repo.insert_one(dto).await?;
        info!(user_id = %user.id, email = %user.email, "User created");
        Ok(user)
    }

    /// Replace the mutable fields of an existing user. The email may stay
    /// the same but must not belong to another user.
    pub async fn update_user(&self, id: i32, dto: UpdateUserDto) -> DomainResult<User> {
        if !self.repo.exists(id).await? {
            return Err(DomainError::user_not_found(id));
        }
        if self.repo.email_exists(&dto.email, Some(id)).await? {
            return Err(DomainError::Conflict(
                "Email already registered to another user".into(),
            ));
        }

        let user = self
            .repo
            .update(id, dto)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        info!(user_id = %id, "User updated");
        Ok(user)
    }

    pub async fn delete_user(&self, id: i32) -> DomainResult<()> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::user_not_found(id));
        }

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Delete every listed user that exists. Ids are checked as a whole up
    /// front; deletion then proceeds one id at a time and is not atomic.
    pub async fn delete_many(&self, ids: &[i32]) -> Result<BulkDeleteReport, BulkDeleteError> {
        if ids.is_empty() {
            return Err(DomainError::Validation("No user ids provided".into()).into());
        }
        if ids.len() > MAX_BULK_DELETE {
            return Err(DomainError::Validation(format!(
                "Cannot delete more than {MAX_BULK_DELETE} users at once"
            ))
            .into());
        }

        let mut report = BulkDeleteReport::default();
        for &id in ids {
            match self.repo.delete(id).await {
                Ok(true) => report.deleted_count += 1,
                Ok(false) => report.not_found_ids.push(id),
                Err(cause) => {
                    warn!(
                        user_id = %id,
                        deleted = report.deleted_count,
                        error = %cause,
                        "Bulk delete aborted"
                    );
                    return Err(BulkDeleteError {
                        deleted_count: report.deleted_count,
                        not_found_ids: report.not_found_ids,
                        cause,
                    });
                }
            }
        }

        info!(
            deleted = report.deleted_count,
            not_found = report.not_found_ids.len(),
            "Bulk delete finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::fixtures::{new_user, numbered_users};
    use crate::infrastructure::InMemoryUserRepository;

    fn service() -> (Arc<InMemoryUserRepository>, UserService<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        (repo.clone(), UserService::new(repo))
    }

    fn changes(first: &str, last: &str, email: &str) -> UpdateUserDto {
        let dto = new_user(first, last, email);
        UpdateUserDto {
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email,
            phone: dto.phone,
            street: dto.street,
            city: dto.city,
            state: dto.state,
            postal_code: dto.postal_code,
            country: dto.country,
            date_of_birth: dto.date_of_birth,
            gender: dto.gender,
            picture_url: dto.picture_url,
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let (_, service) = service();
        service
            .create_user(new_user("Jane", "Doe", "jane@example.com"))
            .await
            .unwrap();

        let err = service
            .create_user(new_user("Janet", "Doe", "jane@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn get_missing_user_is_not_found() {
        let (_, service) = service();
        let err = service.get_user(42).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_keeping_own_email_succeeds() {
        let (_, service) = service();
        let jane = service
            .create_user(new_user("Jane", "Doe", "jane@example.com"))
            .await
            .unwrap();

        let updated = service
            .update_user(jane.id, changes("Jane", "Roe", "jane@example.com"))
            .await
            .unwrap();
        assert_eq!(updated.last_name, "Roe");
        assert_eq!(updated.email, "jane@example.com");
    }

    #[tokio::test]
    async fn update_to_another_users_email_conflicts() {
        let (_, service) = service();
        let jane = service
            .create_user(new_user("Jane", "Doe", "jane@example.com"))
            .await
            .unwrap();
        service
            .create_user(new_user("John", "Roe", "john@example.com"))
            .await
            .unwrap();

        let err = service
            .update_user(jane.id, changes("Jane", "Doe", "john@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let (_, service) = service();
        let err = service
            .update_user(9, changes("Jane", "Doe", "jane@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let (_, service) = service();
        assert!(matches!(
            service.delete_user(1).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn delete_many_reports_missing_ids() {
        let (repo, service) = service();
        repo.insert_many(numbered_users(3)).await.unwrap();

        let report = service.delete_many(&[1, 2, 99, 3, 100]).await.unwrap();
        assert_eq!(report.deleted_count, 3);
        assert_eq!(report.not_found_ids, vec![99, 100]);
        assert!(service.stats().await.unwrap().is_empty);
    }

    #[tokio::test]
    async fn delete_many_validates_the_id_list() {
        let (_, service) = service();

        let empty = service.delete_many(&[]).await.unwrap_err();
        assert!(matches!(empty.cause, DomainError::Validation(_)));

        let ids: Vec<i32> = (1..=101).collect();
        let too_many = service.delete_many(&ids).await.unwrap_err();
        assert!(matches!(too_many.cause, DomainError::Validation(_)));
        assert_eq!(too_many.deleted_count, 0);
    }

    #[tokio::test]
    async fn list_normalizes_paging_and_search() {
        let (repo, service) = service();
        repo.insert_many(numbered_users(25)).await.unwrap();

        let page = service
            .list_users(GetUserDto {
                search: Some("  USER1 ".into()),
                page: Some(0),
                page_size: Some(500),
            })
            .await
            .unwrap();

        // user1 and user10..user19
        assert_eq!(page.total, 11);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 100);
    }

    #[tokio::test]
    async fn stats_reflect_store_contents() {
        let (repo, service) = service();
        assert_eq!(
            service.stats().await.unwrap(),
            UserStats {
                total_users: 0,
                is_empty: true
            }
        );

        repo.insert_many(numbered_users(4)).await.unwrap();
        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_users, 4);
        assert!(!stats.is_empty);
    }
}
