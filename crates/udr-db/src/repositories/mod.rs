//! Repository implementations
//!
//! Concrete implementations of the repository traits defined in udr-core:
//! sqlx-backed PostgreSQL repositories and in-memory equivalents.

pub mod call_record_repo;
pub mod memory;
pub mod subscriber_repo;

pub use call_record_repo::PgCallRecordRepository;
pub use memory::{InMemoryCallRecordRepository, InMemorySubscriberRepository};
pub use subscriber_repo::PgSubscriberRepository;
