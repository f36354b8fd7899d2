//! Non-persistent store implementations

mod memory;

pub use memory::InMemoryUserRepository;
