//! Wire shapes of the randomuser.me API.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::CreateUserDto;

#[derive(Debug, Deserialize)]
pub(super) struct RandomUserResponseDto {
    #[serde(default)]
    pub(super) results: Vec<RandomUserDto>,
    pub(super) error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RandomUserDto {
    #[serde(default)]
    gender: String,
    name: NameDto,
    location: LocationDto,
    email: String,
    dob: DobDto,
    #[serde(default)]
    phone: String,
    picture: PictureDto,
}

#[derive(Debug, Deserialize)]
struct NameDto {
    first: String,
    last: String,
}

#[derive(Debug, Deserialize)]
struct LocationDto {
    street: StreetDto,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    country: String,
    postcode: PostcodeDto,
}

#[derive(Debug, Deserialize)]
struct StreetDto {
    number: i64,
    name: String,
}

/// The API sends numeric postcodes for some nationalities and strings for
/// others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PostcodeDto {
    Number(i64),
    Text(String),
}

impl PostcodeDto {
    fn into_string(self) -> String {
        match self {
            PostcodeDto::Number(n) => n.to_string(),
            PostcodeDto::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DobDto {
    date: String,
}

#[derive(Debug, Deserialize)]
struct PictureDto {
    large: String,
}

impl RandomUserResponseDto {
    pub(super) fn into_new_users(self) -> Result<Vec<CreateUserDto>, String> {
        self.results
            .into_iter()
            .map(RandomUserDto::into_new_user)
            .collect()
    }
}

impl RandomUserDto {
    fn into_new_user(self) -> Result<CreateUserDto, String> {
        let date_of_birth = DateTime::parse_from_rfc3339(&self.dob.date)
            .map_err(|e| format!("invalid date of birth {:?} for {}: {e}", self.dob.date, self.email))?
            .with_timezone(&Utc);

        Ok(CreateUserDto {
            first_name: self.name.first,
            last_name: self.name.last,
            email: self.email,
            phone: self.phone,
            street: format!("{} {}", self.location.street.number, self.location.street.name),
            city: self.location.city,
            state: self.location.state,
            postal_code: self.location.postcode.into_string(),
            country: self.location.country,
            date_of_birth,
            gender: self.gender,
            picture_url: self.picture.large,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const PAYLOAD: &str = r#"{
        "results": [
            {
                "gender": "female",
                "name": { "title": "Miss", "first": "Jennie", "last": "Nichols" },
                "location": {
                    "street": { "number": 8929, "name": "Valwood Pkwy" },
                    "city": "Billings",
                    "state": "Michigan",
                    "country": "United States",
                    "postcode": "63104",
                    "coordinates": { "latitude": "-69.8246", "longitude": "134.8719" }
                },
                "email": "jennie.nichols@example.com",
                "dob": { "date": "1992-03-08T15:13:16.688Z", "age": 30 },
                "phone": "(272) 790-0888",
                "picture": {
                    "large": "https://randomuser.me/api/portraits/women/75.jpg",
                    "medium": "https://randomuser.me/api/portraits/med/women/75.jpg",
                    "thumbnail": "https://randomuser.me/api/portraits/thumb/women/75.jpg"
                }
            },
            {
                "gender": "male",
                "name": { "title": "Mr", "first": "Oliver", "last": "Walker" },
                "location": {
                    "street": { "number": 12, "name": "High Street" },
                    "city": "Leeds",
                    "state": "West Yorkshire",
                    "country": "United Kingdom",
                    "postcode": 90210
                },
                "email": "oliver.walker@example.com",
                "dob": { "date": "1980-12-01T00:30:00-03:00", "age": 44 },
                "phone": "017684 12345",
                "picture": { "large": "https://randomuser.me/api/portraits/men/3.jpg" }
            }
        ],
        "info": { "seed": "abc", "results": 2, "page": 1, "version": "1.4" }
    }"#;

    #[test]
    fn maps_results_into_new_users() {
        let decoded: RandomUserResponseDto = serde_json::from_str(PAYLOAD).unwrap();
        let users = decoded.into_new_users().unwrap();

        assert_eq!(users.len(), 2);
        let jennie = &users[0];
        assert_eq!(jennie.first_name, "Jennie");
        assert_eq!(jennie.street, "8929 Valwood Pkwy");
        assert_eq!(jennie.postal_code, "63104");
        assert_eq!(jennie.date_of_birth.year(), 1992);
        assert_eq!(
            jennie.picture_url,
            "https://randomuser.me/api/portraits/women/75.jpg"
        );
    }

    #[test]
    fn numeric_postcode_and_offset_dates_are_normalized() {
        let decoded: RandomUserResponseDto = serde_json::from_str(PAYLOAD).unwrap();
        let oliver = decoded.into_new_users().unwrap().remove(1);

        assert_eq!(oliver.postal_code, "90210");
        assert_eq!(oliver.date_of_birth.day(), 1);
        assert_eq!(oliver.date_of_birth.hour(), 3);
    }

    #[test]
    fn invalid_date_is_rejected() {
        let body = PAYLOAD.replace("1992-03-08T15:13:16.688Z", "yesterday");
        let decoded: RandomUserResponseDto = serde_json::from_str(&body).unwrap();
        assert!(decoded.into_new_users().is_err());
    }

    #[test]
    fn error_body_decodes_without_results() {
        let decoded: RandomUserResponseDto =
            serde_json::from_str(r#"{ "error": "Uh oh, something has gone wrong." }"#).unwrap();
        assert!(decoded.results.is_empty());
        assert_eq!(
            decoded.error.as_deref(),
            Some("Uh oh, something has gone wrong.")
        );
    }
}
