//! # Mealboard Shared
//!
//! Wire types shared between the API server and its clients: request and
//! response DTOs (camelCase JSON) plus the standard response envelopes.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
