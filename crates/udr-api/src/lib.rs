//! API layer for UDR Billing
//!
//! HTTP handlers for call detail records and usage data reports.

#![forbid(unsafe_code)]
#![warn(clippy::all, missing_docs)]

pub mod dto;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

pub use routes::{configure_routes, query_config};
pub use state::AppState;
