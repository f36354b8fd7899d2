use chrono::{DateTime, Utc};

/// Fields of a user that does not exist yet; the store assigns `id`
/// and the service stamps `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateUserDto {
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
}
