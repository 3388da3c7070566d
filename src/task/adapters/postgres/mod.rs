//! `PostgreSQL` adapters for task and payment persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresPaymentRepository, PostgresTaskRepository, TaskPgPool};
