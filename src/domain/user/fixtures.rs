//! Test fixtures shared by the store, service and HTTP tests.

use chrono::{TimeZone, Utc};

use super::CreateUserDto;

pub fn new_user(first_name: &str, last_name: &str, email: &str) -> CreateUserDto {
    CreateUserDto {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        phone: "(51) 5555-0100".to_string(),
        street: "742 Evergreen Terrace".to_string(),
        city: "Springfield".to_string(),
        state: "Oregon".to_string(),
        postal_code: "97403".to_string(),
        country: "United States".to_string(),
        date_of_birth: Utc.with_ymd_and_hms(1990, 5, 17, 0, 0, 0).unwrap(),
        gender: "female".to_string(),
        picture_url: "https://randomuser.me/api/portraits/women/1.jpg".to_string(),
    }
}

/// `count` distinct users named `user{n}` with `user{n}@example.com` emails.
pub fn numbered_users(count: usize) -> Vec<CreateUserDto> {
    (1..=count)
        .map(|n| new_user(&format!("user{n}"), "Tester", &format!("user{n}@example.com")))
        .collect()
}
