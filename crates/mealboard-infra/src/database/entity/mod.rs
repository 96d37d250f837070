//! SeaORM entities and their domain conversions.

pub mod post;
pub mod user;
