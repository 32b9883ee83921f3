//! UDR Billing Database Layer
//!
//! This crate provides storage for call records and subscribers. It includes:
//!
//! - Connection pool management and schema migrations with sqlx
//! - PostgreSQL repository implementations
//! - In-memory repository implementations for local runs and tests

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use sqlx::PgPool;
pub use udr_core::{AppError, AppResult};
