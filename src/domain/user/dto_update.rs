use chrono::{DateTime, Utc};

/// Full replacement of a user's mutable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateUserDto {
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
