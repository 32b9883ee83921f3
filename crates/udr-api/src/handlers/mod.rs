//! HTTP request handlers

pub mod cdr;
pub mod health;
pub mod udr;

pub use cdr::configure as configure_cdr;
pub use health::health_check;
pub use udr::configure as configure_udr;
