//! User DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::{BulkDeleteReport, IngestionReport, UserStats};
use crate::domain::{CreateUserDto, GetUserDto, UpdateUserDto, User};

/// User API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub date_of_birth: DateTime<Utc>,
    pub gender: String,
    pub picture_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            phone: u.phone,
            street: u.street,
            city: u.city,
            state: u.state,
            postal_code: u.postal_code,
            country: u.country,
            date_of_birth: u.date_of_birth,
            gender: u.gender,
            picture_url: u.picture_url,
            created_at: u.created_at,
        }
    }
}

/// Body of create and update requests. Update replaces every field.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserRequest {
    #[validate(length(min = 1, max = 100, message = "first name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last name must be 1-100 characters"))]
    pub last_name: String,
    #[validate(
        email(message = "invalid email format"),
        length(max = 200, message = "email must be at most 200 characters")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub street: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub city: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub state: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub postal_code: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub country: String,
    pub date_of_birth: DateTime<Utc>,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub gender: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub picture_url: String,
}

pub type CreateUserRequest = UserRequest;
pub type UpdateUserRequest = UserRequest;

impl From<UserRequest> for CreateUserDto {
    fn from(r: UserRequest) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            phone: r.phone,
            street: r.street,
            city: r.city,
            state: r.state,
            postal_code: r.postal_code,
            country: r.country,
            date_of_birth: r.date_of_birth,
            gender: r.gender,
            picture_url: r.picture_url,
        }
    }
}

impl From<UserRequest> for UpdateUserDto {
    fn from(r: UserRequest) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            phone: r.phone,
            street: r.street,
            city: r.city,
            state: r.state,
            postal_code: r.postal_code,
            country: r.country,
            date_of_birth: r.date_of_birth,
            gender: r.gender,
            picture_url: r.picture_url,
        }
    }
}

/// List users query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListUsersParams {
    /// Case-insensitive match on name, email, city or country
    #[serde(alias = "searchTerm")]
    pub search: Option<String>,
    /// 1-based page number (default 1)
    pub page: Option<i64>,
    /// Items per page, 1-100 (default 10)
    #[serde(alias = "pageSize")]
    pub page_size: Option<i64>,
}

impl From<ListUsersParams> for GetUserDto {
    fn from(p: ListUsersParams) -> Self {
        Self {
            search: p.search,
            page: p.page,
            page_size: p.page_size,
        }
    }
}

/// Add-users query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct AddUsersParams {
    /// How many random users to fetch, 1-100 (default 10)
    #[serde(default = "default_add_count")]
    pub count: i64,
}

fn default_add_count() -> i64 {
    10
}

/// Outcome of an add-users run. On failure `added` and `batches` report
/// what was persisted before the error.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddUsersResponse {
    pub message: String,
    pub added: u64,
    pub batches: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_total: Option<u64>,
}

impl AddUsersResponse {
    pub fn completed(report: &IngestionReport, previous_total: u64, current_total: u64) -> Self {
        Self {
            message: format!("{} users added", report.added),
            added: report.added,
            batches: report.batches,
            previous_total: Some(previous_total),
            current_total: Some(current_total),
        }
    }

    pub fn partial(added: u64, batches: u32) -> Self {
        Self {
            message: format!("Stopped after adding {added} users"),
            added,
            batches,
            previous_total: None,
            current_total: None,
        }
    }
}

/// Outcome of a bulk delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUsersResponse {
    pub message: String,
    pub deleted_count: u64,
    pub not_found_count: usize,
    pub not_found_ids: Vec<i32>,
}

impl From<BulkDeleteReport> for DeleteUsersResponse {
    fn from(r: BulkDeleteReport) -> Self {
        Self {
            message: format!("{} users deleted", r.deleted_count),
            deleted_count: r.deleted_count,
            not_found_count: r.not_found_ids.len(),
            not_found_ids: r.not_found_ids,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserStatsDto {
    pub total_users: u64,
    pub is_empty: bool,
}

impl From<UserStats> for UserStatsDto {
    fn from(s: UserStats) -> Self {
        Self {
            total_users: s.total_users,
            is_empty: s.is_empty,
        }
    }
}
