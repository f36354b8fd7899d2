//! # User Directory
//!
//! REST service managing a directory of users, with paginated
//! case-insensitive search and batched ingestion from the randomuser.me API.
//!
//! ## Architecture
//!
//! - **domain**: the `User` entity, DTOs and the store / source ports
//! - **application**: `UserService` (CRUD, bulk delete, stats) and
//!   `UserIngestionService` (paced batch ingestion)
//! - **infrastructure**: SeaORM and in-memory stores, the reqwest
//!   randomuser.me client
//! - **interfaces**: axum REST API with Swagger documentation
//! - **server**: runtime bootstrap and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig};
pub use interfaces::create_api_router;
