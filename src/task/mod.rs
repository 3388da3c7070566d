//! Work-order coordination: the task lifecycle, field check-in/check-out,
//! payments, and attachments.
//!
//! Laid out hexagonally: `domain` holds the pure aggregates and rules,
//! `ports` the persistence and storage contracts, `adapters` the in-memory
//! and Postgres implementations, and `services` the orchestration that glues
//! them to the activity log.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
