//! Unit tests for the task module.

mod geo_tests;
mod lifecycle_tests;

use crate::task::domain::{
    Actor, PersistedTaskData, Role, Task, TaskId, TaskStatus, UserId,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Builds a task stuck in the given status with one assigned worker.
pub(crate) fn task_in_status(status: TaskStatus, worker: UserId) -> Task {
    let now = Utc::now();
    Task::from_persisted(PersistedTaskData {
        id: TaskId::from_raw(1),
        name: "Replace water heater".to_owned(),
        status,
        location: None,
        expected_revenue: Some(Decimal::new(250_000, 2)),
        assignee_ids: BTreeSet::from([worker]),
        created_at: now,
        updated_at: now,
    })
}

pub(crate) fn admin() -> Actor {
    Actor::new(UserId::new(), Role::Admin)
}

pub(crate) fn worker(user_id: UserId) -> Actor {
    Actor::new(user_id, Role::Worker)
}
