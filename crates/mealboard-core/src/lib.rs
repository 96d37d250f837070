//! # Mealboard Core
//!
//! The domain layer of the campus food-sharing board.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod validate;

pub use error::DomainError;
