use chrono::{DateTime, Utc};

/// User model
#[derive(Clone, Debug, PartialEq)]
pub struct User {
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

/// Lowercased, newline-joined searchable fields (first name, last name,
/// email, city, country).
///
/// SQLite's `LOWER` folds ASCII only, so stores match against this key.
pub fn search_key(
    first_name: &str,
    last_name: &str,
    email: &str,
    city: &str,
    country: &str,
) -> String {
    [first_name, last_name, email, city, country]
        .join("\n")
        .to_lowercase()
}

impl User {
    pub fn search_key(&self) -> String {
        search_key(
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.city,
            &self.country,
        )
    }

    /// Case-insensitive substring match over the searchable fields.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.search_key().contains(needle)
    }
}
