use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Random user source: {0}")]
    Upstream(#[from] SourceError),

    #[error("Database error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn user_not_found(id: i32) -> Self {
        DomainError::NotFound {
            entity: "User",
            field: "id",
            value: id.to_string(),
        }
    }
}

/// Failures of the external random-user source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("source returned no records for a request of {requested}")]
    EmptyBatch { requested: usize },
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Storage(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_user() {
        let err = DomainError::user_not_found(42);
        assert_eq!(err.to_string(), "Not found: User with id=42");
    }

    #[test]
    fn source_errors_convert_into_upstream() {
        let err: DomainError = SourceError::EmptyBatch { requested: 20 }.into();
        assert!(matches!(
            err,
            DomainError::Upstream(SourceError::EmptyBatch { requested: 20 })
        ));
    }
}
