//! Step definitions for field-event BDD scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
