//! Application layer - use-case orchestration over the domain ports

pub mod users;

pub use users::{
    BulkDeleteError, BulkDeleteReport, IngestionError, IngestionReport, IngestionSettings,
    UserIngestionService, UserService, UserStats, MAX_BULK_DELETE,
};
