//! Database adapters: Postgres via SeaORM, plus in-memory repositories
//! for running and testing without a database.

mod connections;
pub mod entity;
mod memory;
mod postgres_repo;

pub use connections::{DatabaseConfig, connect};
pub use memory::{InMemoryPostRepository, InMemoryUserRepository};
pub use postgres_repo::{PostgresPostRepository, PostgresUserRepository};

#[cfg(test)]
mod tests;
