//! Data Transfer Objects (DTOs) for API requests and responses

pub mod cdr;
pub mod common;
pub mod udr;

pub use cdr::*;
pub use common::*;
pub use udr::*;
