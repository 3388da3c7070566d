//! Append-only activity log for Waymark.
//!
//! Every mutation in the system is recorded here as an immutable, replayable
//! record; the log is both the audit trail and the source of the user-facing
//! feed. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Read-side transforms in [`projection`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod projection;

#[cfg(test)]
mod tests;
