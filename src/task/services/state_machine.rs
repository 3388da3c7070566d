//! Lifecycle state machine: validated, linearized, audited transitions.

use crate::activity::{
    domain::{ActivityPayload, Topic},
    ports::{ActivityLog, ActivityLogError},
};
use crate::task::{
    domain::{Actor, Task, TaskDomainError, TaskStatus, TransitionTrigger},
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while advancing a task's lifecycle.
#[derive(Debug, Error)]
pub enum TaskStateMachineError {
    /// The transition was rejected by the domain rules.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The repository rejected the conditional update.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The activity log could not record the accepted transition.
    #[error(transparent)]
    Log(#[from] ActivityLogError),
}

/// Result type for state machine operations.
pub type TaskStateMachineResult<T> = Result<T, TaskStateMachineError>;

/// Owns every status write in the system.
///
/// Each accepted transition is a conditional repository update followed by
/// exactly one `TASK_STATUS_UPDATED` activity; a rejected transition writes
/// nothing. A log failure after the conditional update is surfaced as an
/// error — the caller retries the whole operation, and the compare-and-swap
/// turns the retry into a conflict instead of a double transition.
pub struct TaskStateMachine<R, L, C>
where
    R: TaskRepository,
    L: ActivityLog,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    log: Arc<L>,
    clock: Arc<C>,
}

impl<R, L, C> Clone for TaskStateMachine<R, L, C>
where
    R: TaskRepository,
    L: ActivityLog,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            log: Arc::clone(&self.log),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, L, C> TaskStateMachine<R, L, C>
where
    R: TaskRepository,
    L: ActivityLog,
    C: Clock + Send + Sync,
{
    /// Creates a new state machine.
    #[must_use]
    pub const fn new(repository: Arc<R>, log: Arc<L>, clock: Arc<C>) -> Self {
        Self {
            repository,
            log,
            clock,
        }
    }

    /// Advances a task along a lifecycle edge.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStateMachineError::Domain`] when the edge, role, or
    /// trigger is rejected; [`TaskStateMachineError::Repository`] when the
    /// task vanished or the conditional update lost a race;
    /// [`TaskStateMachineError::Log`] when the audit record could not be
    /// appended.
    pub async fn transition(
        &self,
        task: &Task,
        actor: &Actor,
        target: TaskStatus,
        trigger: TransitionTrigger,
    ) -> TaskStateMachineResult<Task> {
        let change = task.authorize_transition(actor, target, trigger)?;
        let updated = self
            .repository
            .transition_status(task.id(), change.from, change.to, self.clock.utc())
            .await?;
        self.log
            .record(
                &Topic::for_task(task.id()),
                ActivityPayload::TaskStatusUpdated {
                    old_status: change.from,
                    new_status: change.to,
                },
                Some(actor.user_id()),
            )
            .await?;
        tracing::info!(
            task_id = %task.id(),
            from = %change.from,
            to = %change.to,
            "task status updated"
        );
        Ok(updated)
    }
}
