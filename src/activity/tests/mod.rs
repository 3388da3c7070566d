//! Unit tests for the activity module.

mod feed_tests;

use crate::activity::domain::{
    Activity, ActivityId, ActivityPayload, PersistedActivityData, Topic,
};
use crate::task::domain::{TaskStatus, UserId};
use chrono::{DateTime, Duration, TimeZone, Utc};

pub(crate) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("valid fixed timestamp")
}

/// Builds a record at `base_time() + offset_seconds` with a sequential id.
pub(crate) fn record_at(id: i64, payload: ActivityPayload, offset_seconds: i64) -> Activity {
    Activity::from_persisted(PersistedActivityData {
        id: ActivityId::from_raw(id),
        topic: Topic::new("TASK_1"),
        payload,
        user_id: Some(UserId::new()),
        created_at: base_time() + Duration::seconds(offset_seconds),
    })
}

pub(crate) fn status_payload(from: TaskStatus, to: TaskStatus) -> ActivityPayload {
    ActivityPayload::TaskStatusUpdated {
        old_status: from,
        new_status: to,
    }
}

pub(crate) fn note_payload(notes: &str) -> ActivityPayload {
    ActivityPayload::TaskCheckedIn {
        distance_from_task: None,
        notes: Some(notes.to_owned()),
        warnings: Vec::new(),
        attachments: Vec::new(),
    }
}
