//! Adapter implementations of the task module ports.

pub mod memory;
pub mod postgres;
