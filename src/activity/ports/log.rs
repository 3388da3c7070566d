//! Port contract for the append-only activity log.

use crate::activity::domain::{Activity, ActivityPayload, Topic};
use crate::task::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for activity log operations.
pub type ActivityLogResult<T> = Result<T, ActivityLogError>;

/// Append-only activity log contract.
///
/// `record` only ever appends; there is no update or delete. For any task,
/// replaying the `TASK_STATUS_UPDATED` records of its topic in order
/// reconstructs the exact status history — the task's `status` column is a
/// cached projection of this log.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Appends an activity record, assigning its identifier and timestamp.
    ///
    /// # Errors
    ///
    /// Fails only on infrastructure errors; domain callers never see a
    /// rejected append.
    async fn record(
        &self,
        topic: &Topic,
        payload: ActivityPayload,
        user_id: Option<UserId>,
    ) -> ActivityLogResult<Activity>;

    /// Returns all activities for a topic, oldest first.
    async fn query(&self, topic: &Topic) -> ActivityLogResult<Vec<Activity>>;
}

/// Errors returned by activity log implementations.
#[derive(Debug, Clone, Error)]
pub enum ActivityLogError {
    /// Infrastructure-level failure (connection, serialization, lock).
    #[error("activity log failure: {0}")]
    Infrastructure(Arc<dyn std::error::Error + Send + Sync>),
}

impl ActivityLogError {
    /// Wraps an infrastructure error.
    #[must_use]
    pub fn infrastructure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Infrastructure(Arc::new(err))
    }
}
