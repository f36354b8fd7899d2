//! Infrastructure layer - external concerns

pub mod database;
pub mod random_user;
pub mod storage;

pub use database::repositories::UserRepository;
pub use database::{init_database, DatabaseConfig, PoolConfig};
pub use random_user::{RandomUserClient, RandomUserIdentity};
pub use storage::InMemoryUserRepository;
