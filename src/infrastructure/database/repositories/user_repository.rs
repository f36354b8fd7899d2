use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use tracing::debug;

use crate::domain::user::search_key;
use crate::domain::{
    CreateUserDto, DomainError, DomainResult, UpdateUserDto, User, UserPageQuery,
    UserRepositoryInterface,
};
use crate::infrastructure::database::entities::user;
use crate::shared::PaginatedResult;

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone: model.phone,
        street: model.street,
        city: model.city,
        state: model.state,
        postal_code: model.postal_code,
        country: model.country,
        date_of_birth: model.date_of_birth,
        gender: model.gender,
        picture_url: model.picture_url,
        created_at: model.created_at,
    }
}

fn new_active_model(dto: CreateUserDto, created_at: DateTime<Utc>) -> user::ActiveModel {
    let key = search_key(
        &dto.first_name,
        &dto.last_name,
        &dto.email,
        &dto.city,
        &dto.country,
    );
    user::ActiveModel {
        id: NotSet,
        first_name: Set(dto.first_name),
        last_name: Set(dto.last_name),
        email: Set(dto.email),
        phone: Set(dto.phone),
        street: Set(dto.street),
        city: Set(dto.city),
        state: Set(dto.state),
        postal_code: Set(dto.postal_code),
        country: Set(dto.country),
        date_of_birth: Set(dto.date_of_birth),
        gender: Set(dto.gender),
        picture_url: Set(dto.picture_url),
        search_key: Set(key),
        created_at: Set(created_at),
    }
}

fn write_err(e: sea_orm::DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::Conflict("Email already registered".to_string())
        }
        _ => DomainError::from(e),
    }
}

/// Escapes LIKE wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `search_key LIKE '%term%'`, with the term lowercased the same way the
/// key was.
fn search_condition(term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    Expr::col(user::Column::SearchKey).like(LikeExpr::new(pattern).escape('\\'))
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn insert_one(&self, dto: CreateUserDto) -> DomainResult<User> {
        let created = new_active_model(dto, Utc::now())
            .insert(&self.db)
            .await
            .map_err(write_err)?;

        Ok(user_model_to_domain(created))
    }

    async fn insert_many(&self, dtos: Vec<CreateUserDto>) -> DomainResult<u64> {
        if dtos.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let rows = dtos.len() as u64;
        let models = dtos.into_iter().map(|dto| new_active_model(dto, now));

        user::Entity::insert_many(models)
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        debug!(rows, "Inserted user batch");
        Ok(rows)
    }

    async fn get_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn update(&self, id: i32, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let Some(existing) = user::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = existing.into();
        active.search_key = Set(search_key(
            &dto.first_name,
            &dto.last_name,
            &dto.email,
            &dto.city,
            &dto.country,
        ));
        active.first_name = Set(dto.first_name);
        active.last_name = Set(dto.last_name);
        active.email = Set(dto.email);
        active.phone = Set(dto.phone);
        active.street = Set(dto.street);
        active.city = Set(dto.city);
        active.state = Set(dto.state);
        active.postal_code = Set(dto.postal_code);
        active.country = Set(dto.country);
        active.date_of_birth = Set(dto.date_of_birth);
        active.gender = Set(dto.gender);
        active.picture_url = Set(dto.picture_url);

        let updated = active.update(&self.db).await.map_err(write_err)?;
        Ok(Some(user_model_to_domain(updated)))
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        let result = user::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(user::Entity::find().count(&self.db).await?)
    }

    async fn exists(&self, id: i32) -> DomainResult<bool> {
        Ok(user::Entity::find_by_id(id).count(&self.db).await? > 0)
    }

    async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> DomainResult<bool> {
        let mut query = user::Entity::find().filter(user::Column::Email.eq(email));

        if let Some(id) = exclude_id {
            query = query.filter(user::Column::Id.ne(id));
        }

        Ok(query.count(&self.db).await? > 0)
    }

    async fn query_page(&self, query: &UserPageQuery) -> DomainResult<PaginatedResult<User>> {
        let mut select = user::Entity::find();

        if let Some(ref term) = query.search {
            select = select.filter(search_condition(term));
        }

        let total = select.clone().count(&self.db).await?;

        let pagination = query.pagination;
        let models = select
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.page_size)
            .all(&self.db)
            .await?;

        let items = models.into_iter().map(user_model_to_domain).collect();
        Ok(PaginatedResult::new(
            items,
            total,
            pagination.page,
            pagination.page_size,
        ))
    }
}
