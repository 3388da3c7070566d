//! Waymark coordinates field-service work orders: admins prepare and assign
//! tasks, workers check in and out on site with GPS evidence, payments are
//! reconciled against revenue targets, and every mutation lands in an
//! append-only activity log.
//!
//! The crate is laid out hexagonally. [`task`] owns the lifecycle,
//! geolocation, payment, and attachment rules together with their
//! persistence ports and adapters; [`activity`] owns the audit log and the
//! deduplicating feed projection; [`api`] exposes both over HTTP.

pub mod activity;
pub mod api;
pub mod task;
