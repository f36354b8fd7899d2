//! User management use-cases
//!
//! HTTP handlers are thin wrappers that delegate to these services.

mod ingestion;
mod service;

pub use ingestion::{IngestionError, IngestionReport, IngestionSettings, UserIngestionService};
pub use service::{BulkDeleteError, BulkDeleteReport, UserService, UserStats, MAX_BULK_DELETE};
