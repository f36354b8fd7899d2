//! In-memory user store

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, UpdateUserDto, User, UserPageQuery,
    UserRepositoryInterface,
};
use crate::shared::PaginatedResult;

/// In-memory user store for development and testing
///
/// Mirrors the database store: unique emails, all-or-nothing batch inserts
/// and newest-first ordering.
pub struct InMemoryUserRepository {
    users: DashMap<i32, User>,
    id_counter: AtomicI32,
    // Serializes writes so email checks and inserts are atomic together.
    write_lock: Mutex<()>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            id_counter: AtomicI32::new(1),
            write_lock: Mutex::new(()),
        }
    }

    fn lock_writes(&self) -> DomainResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| DomainError::Storage("in-memory store lock poisoned".to_string()))
    }

    fn email_taken(&self, email: &str, exclude_id: Option<i32>) -> bool {
        self.users
            .iter()
            .any(|entry| entry.email == email && Some(entry.id) != exclude_id)
    }

    fn build_user(&self, dto: CreateUserDto, created_at: DateTime<Utc>) -> User {
        User {
            id: self.id_counter.fetch_add(1, Ordering::SeqCst),
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
            created_at,
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn email_conflict() -> DomainError {
    DomainError::Conflict("Email already registered".to_string())
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn insert_one(&self, dto: CreateUserDto) -> DomainResult<User> {
        let _guard = self.lock_writes()?;
        if self.email_taken(&dto.email, None) {
            return Err(email_conflict());
        }

        let user = self.build_user(dto, Utc::now());
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn insert_many(&self, dtos: Vec<CreateUserDto>) -> DomainResult<u64> {
        let _guard = self.lock_writes()?;

        for (i, dto) in dtos.iter().enumerate() {
            let repeated = dtos[..i].iter().any(|earlier| earlier.email == dto.email);
            if repeated || self.email_taken(&dto.email, None) {
                return Err(email_conflict());
            }
        }

        let now = Utc::now();
        let rows = dtos.len() as u64;
        for dto in dtos {
            let user = self.build_user(dto, now);
            self.users.insert(user.id, user);
        }
        Ok(rows)
    }

    async fn get_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.clone()))
    }

    async fn update(&self, id: i32, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let _guard = self.lock_writes()?;
        if !self.users.contains_key(&id) {
            return Ok(None);
        }
        if self.email_taken(&dto.email, Some(id)) {
            return Err(email_conflict());
        }

        let Some(mut entry) = self.users.get_mut(&id) else {
            return Ok(None);
        };
        let user = entry.value_mut();
        user.first_name = dto.first_name;
        user.last_name = dto.last_name;
        user.email = dto.email;
        user.phone = dto.phone;
        user.street = dto.street;
        user.city = dto.city;
        user.state = dto.state;
        user.postal_code = dto.postal_code;
        user.country = dto.country;
        user.date_of_birth = dto.date_of_birth;
        user.gender = dto.gender;
        user.picture_url = dto.picture_url;

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        let _guard = self.lock_writes()?;
        Ok(self.users.remove(&id).is_some())
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }

    async fn exists(&self, id: i32) -> DomainResult<bool> {
        Ok(self.users.contains_key(&id))
    }

    async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> DomainResult<bool> {
        Ok(self.email_taken(email, exclude_id))
    }

    async fn query_page(&self, query: &UserPageQuery) -> DomainResult<PaginatedResult<User>> {
        let needle = query.search.as_deref().map(str::to_lowercase);

        let mut matching: Vec<User> = self
            .users
            .iter()
            .filter(|entry| needle.as_deref().map_or(true, |n| entry.matches_search(n)))
            .map(|entry| entry.clone())
            .collect();

        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let pagination = query.pagination;
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
            .take(pagination.page_size as usize)
            .collect();

        Ok(PaginatedResult::new(
            items,
            total,
            pagination.page,
            pagination.page_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::fixtures::{new_user, numbered_users};

    #[tokio::test]
    async fn third_page_of_twenty_five() {
        let repo = InMemoryUserRepository::new();
        repo.insert_many(numbered_users(25)).await.unwrap();

        let page = repo
            .query_page(&UserPageQuery::new(3, 10, None))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total, 25);
        // Same created_at for the whole batch, so the lowest ids come last.
        assert_eq!(
            page.items.iter().map(|u| u.id).collect::<Vec<_>>(),
            vec![5, 4, 3, 2, 1]
        );
    }

    #[tokio::test]
    async fn page_far_past_the_end_is_empty() {
        let repo = InMemoryUserRepository::new();
        repo.insert_many(numbered_users(3)).await.unwrap();

        let page = repo
            .query_page(&UserPageQuery::new(i64::MAX as u64, 100, None))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert!(!page.has_next());
    }

    #[tokio::test]
    async fn accented_names_match_regardless_of_case() {
        let repo = InMemoryUserRepository::new();
        repo.insert_one(new_user("ÉLIO", "Araújo", "elio@example.com"))
            .await
            .unwrap();

        let page = repo
            .query_page(&UserPageQuery::new(1, 10, Some("élio")))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn batch_with_duplicate_email_writes_nothing() {
        let repo = InMemoryUserRepository::new();
        repo.insert_one(new_user("Ana", "Silva", "user2@example.com"))
            .await
            .unwrap();

        let err = repo.insert_many(numbered_users(3)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn search_matches_any_searchable_field() {
        let repo = InMemoryUserRepository::new();
        repo.insert_one(new_user("Jane", "Doe", "jane@example.com"))
            .await
            .unwrap();
        repo.insert_one(new_user("John", "Smith", "john@example.com"))
            .await
            .unwrap();

        let page = repo
            .query_page(&UserPageQuery::new(1, 10, Some("SMITH")))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].first_name, "John");
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_user() {
        let repo = InMemoryUserRepository::new();
        let jane = repo
            .insert_one(new_user("Jane", "Doe", "jane@example.com"))
            .await
            .unwrap();
        repo.insert_one(new_user("John", "Smith", "john@example.com"))
            .await
            .unwrap();

        let dto = new_user("Jane", "Doe", "john@example.com");
        let changes = UpdateUserDto {
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
        };
        let err = repo.update(jane.id, changes).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_then_exists() {
        let repo = InMemoryUserRepository::new();
        let jane = repo
            .insert_one(new_user("Jane", "Doe", "jane@example.com"))
            .await
            .unwrap();

        assert!(repo.exists(jane.id).await.unwrap());
        assert!(repo.delete(jane.id).await.unwrap());
        assert!(!repo.exists(jane.id).await.unwrap());
        assert!(!repo.delete(jane.id).await.unwrap());
    }
}
