//! Repository port for payment persistence.

use crate::task::domain::{Payment, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for payment repository operations.
pub type PaymentRepositoryResult<T> = Result<T, PaymentRepositoryError>;

/// Payment persistence contract.
///
/// The business rule caps a task at one current payment; the activity log,
/// not this store, carries the correction history.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Stores the payment collected for a task.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentRepositoryError::DuplicatePayment`] when the task
    /// already has a current payment.
    async fn store(&self, payment: &Payment) -> PaymentRepositoryResult<()>;

    /// Replaces the current payment after an admin correction.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentRepositoryError::NotFound`] when the task has no
    /// current payment.
    async fn replace(&self, payment: &Payment) -> PaymentRepositoryResult<()>;

    /// Returns the current payment for a task, if one was collected.
    async fn find_by_task(&self, task_id: TaskId) -> PaymentRepositoryResult<Option<Payment>>;
}

/// Errors returned by payment repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PaymentRepositoryError {
    /// The task already has a current payment.
    #[error("task {0} already has a payment")]
    DuplicatePayment(TaskId),

    /// No current payment exists for the task.
    #[error("no payment found for task {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PaymentRepositoryError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
