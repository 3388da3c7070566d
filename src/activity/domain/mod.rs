//! Domain model for the append-only activity log.

mod activity;

pub use activity::{
    Activity, ActivityAction, ActivityId, ActivityPayload, PersistedActivityData, Topic,
};
