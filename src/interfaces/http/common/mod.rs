//! Shared HTTP building blocks: response envelopes and extractors

mod response;
mod validated_json;

pub use response::{ApiResponse, PaginatedResponse};
pub use validated_json::{invalid_json, FieldViolation, ValidatedJson, ValidatedJsonRejection};
