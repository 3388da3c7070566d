//! Repository port for task persistence and linearized status transitions.

use crate::task::domain::{Task, TaskDraft, TaskId, TaskStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Status writes go exclusively through [`TaskRepository::transition_status`],
/// a compare-and-swap on the current status. This linearizes transitions per
/// task under any storage engine with atomic conditional updates — no
/// external lock is involved, and the loser of a race gets
/// [`TaskRepositoryError::StatusConflict`].
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persists a draft, assigning the task identifier.
    async fn create(&self, draft: &TaskDraft) -> TaskRepositoryResult<Task>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Persists non-status changes (assignees, expected revenue, location).
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn update_details(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Conditionally advances the status: the write succeeds only when the
    /// stored status still equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist, or [`TaskRepositoryError::StatusConflict`] when the stored
    /// status no longer matches `expected`.
    async fn transition_status(
        &self,
        id: TaskId,
        expected: TaskStatus,
        next: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The conditional status update lost against a concurrent transition or
    /// an unexpected pre-state.
    #[error("task {task_id} status is {actual}, expected {expected}")]
    StatusConflict {
        /// Task whose update was rejected.
        task_id: TaskId,
        /// Status the caller expected to move from.
        expected: TaskStatus,
        /// Status actually stored.
        actual: TaskStatus,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
