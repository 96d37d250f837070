//! # Mealboard Infrastructure
//!
//! Concrete implementations of the ports defined in `mealboard-core`:
//! SeaORM/Postgres repositories, in-memory repositories for running
//! without a database, and the JWT + Argon2 auth services.

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtTokenService};
pub use database::{
    DatabaseConfig, InMemoryPostRepository, InMemoryUserRepository, PostgresPostRepository,
    PostgresUserRepository, connect,
};
