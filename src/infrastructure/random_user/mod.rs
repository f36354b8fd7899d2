//! randomuser.me adapter for the `RandomUserSource` port.
//!
//! Owns transport details only: query building, timeout and HTTP error
//! mapping, and JSON decoding into new users.

mod client;
mod dto;

pub use client::{RandomUserClient, RandomUserIdentity};
