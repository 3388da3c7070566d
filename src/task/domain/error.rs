//! Error types for task domain validation and transition checks.

use super::{TaskId, TaskStatus, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TaskDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// A coordinate pair falls outside the valid latitude/longitude ranges.
    #[error("invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        /// Rejected latitude value.
        latitude: f64,
        /// Rejected longitude value.
        longitude: f64,
    },

    /// A GPS accuracy radius is negative or not finite.
    #[error("invalid GPS accuracy {0}m")]
    InvalidAccuracy(f64),

    /// The expected revenue is negative.
    #[error("expected revenue must not be negative, got {0}")]
    NegativeExpectedRevenue(Decimal),

    /// The collected payment amount is zero or negative.
    #[error("payment amount must be positive, got {0}")]
    NonPositivePaymentAmount(Decimal),

    /// The requested status transition is not a legal lifecycle edge, or is
    /// not reachable through the requested trigger.
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Current status at the time of the request.
        from: TaskStatus,
        /// Requested target status.
        to: TaskStatus,
    },

    /// The actor is not in the task's assignee set.
    #[error("user {user_id} is not assigned to task {task_id}")]
    NotAssigned {
        /// Task the actor tried to advance.
        task_id: TaskId,
        /// The unassigned actor.
        user_id: UserId,
    },

    /// The operation is restricted to administrators.
    #[error("user {user_id} must be an admin to perform this operation")]
    AdminRequired {
        /// The non-admin actor.
        user_id: UserId,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing actor roles from identity headers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
