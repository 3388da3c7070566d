//! Port contracts for the activity module.

mod log;

pub use log::{ActivityLog, ActivityLogError, ActivityLogResult};
