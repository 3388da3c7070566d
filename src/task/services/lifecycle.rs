//! Administrative task lifecycle operations.
//!
//! Everything here is admin-facing: creating tasks, releasing them to the
//! field, reshaping assignees and revenue targets, correcting payments, and
//! managing attachments. Each mutation appends exactly one activity after
//! the persistence write succeeds.

use crate::activity::{
    domain::{ActivityPayload, Topic},
    ports::{ActivityLog, ActivityLogError},
};
use crate::task::{
    domain::{
        Actor, AttachmentId, AttachmentRef, Payment, Task, TaskDomainError, TaskDraft, TaskId,
        TaskLocation, TaskStatus, TransitionTrigger, UserId,
    },
    ports::{
        AttachmentStore, AttachmentStoreError, AttachmentUpload, PaymentRepository,
        PaymentRepositoryError, StoredAttachment, TaskRepository, TaskRepositoryError,
    },
    services::{FileUpload, TaskStateMachine, TaskStateMachineError},
};
use mockable::Clock;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskRequest {
    name: String,
    location: Option<TaskLocation>,
    expected_revenue: Option<Decimal>,
    assignee_ids: Vec<UserId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
            expected_revenue: None,
            assignee_ids: Vec::new(),
        }
    }

    /// Sets the reference location.
    #[must_use]
    pub fn with_location(mut self, location: TaskLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets the expected revenue target.
    #[must_use]
    pub const fn with_expected_revenue(mut self, amount: Decimal) -> Self {
        self.expected_revenue = Some(amount);
        self
    }

    /// Sets the initial assignee set.
    #[must_use]
    pub fn with_assignees(mut self, assignee_ids: impl IntoIterator<Item = UserId>) -> Self {
        self.assignee_ids = assignee_ids.into_iter().collect();
        self
    }
}

/// A task together with its current payment, if one was collected.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetails {
    /// The task aggregate.
    pub task: Task,
    /// The current payment record.
    pub payment: Option<Payment>,
}

/// Errors raised by the lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// No payment exists to correct.
    #[error("no payment found for task {0}")]
    PaymentNotFound(TaskId),

    /// Domain rules rejected the operation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Task persistence failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// Payment persistence failed.
    #[error(transparent)]
    Payments(#[from] PaymentRepositoryError),

    /// The storage collaborator failed.
    #[error(transparent)]
    Storage(#[from] AttachmentStoreError),

    /// The activity log could not be appended.
    #[error(transparent)]
    Log(#[from] ActivityLogError),
}

impl From<TaskStateMachineError> for TaskLifecycleError {
    fn from(err: TaskStateMachineError) -> Self {
        match err {
            TaskStateMachineError::Domain(inner) => Self::Domain(inner),
            TaskStateMachineError::Repository(inner) => Self::Repository(inner),
            TaskStateMachineError::Log(inner) => Self::Log(inner),
        }
    }
}

/// Result type for lifecycle operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Admin-facing task operations.
pub struct TaskLifecycleService<R, P, S, L, C>
where
    R: TaskRepository,
    P: PaymentRepository,
    S: AttachmentStore,
    L: ActivityLog,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    payments: Arc<P>,
    storage: Arc<S>,
    log: Arc<L>,
    clock: Arc<C>,
    machine: TaskStateMachine<R, L, C>,
}

impl<R, P, S, L, C> Clone for TaskLifecycleService<R, P, S, L, C>
where
    R: TaskRepository,
    P: PaymentRepository,
    S: AttachmentStore,
    L: ActivityLog,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            payments: Arc::clone(&self.payments),
            storage: Arc::clone(&self.storage),
            log: Arc::clone(&self.log),
            clock: Arc::clone(&self.clock),
            machine: self.machine.clone(),
        }
    }
}

impl<R, P, S, L, C> TaskLifecycleService<R, P, S, L, C>
where
    R: TaskRepository,
    P: PaymentRepository,
    S: AttachmentStore,
    L: ActivityLog,
    C: Clock + Send + Sync,
{
    /// Creates a new lifecycle service.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        payments: Arc<P>,
        storage: Arc<S>,
        log: Arc<L>,
        clock: Arc<C>,
    ) -> Self {
        let machine = TaskStateMachine::new(
            Arc::clone(&repository),
            Arc::clone(&log),
            Arc::clone(&clock),
        );
        Self {
            repository,
            payments,
            storage,
            log,
            clock,
            machine,
        }
    }

    /// Creates a task in the preparing state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AdminRequired`] for non-admin actors and
    /// [`TaskDomainError::EmptyTaskName`] or
    /// [`TaskDomainError::NegativeExpectedRevenue`] for invalid input.
    pub async fn create_task(
        &self,
        actor: &Actor,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        require_admin(actor)?;
        let mut draft = TaskDraft::new(request.name, &*self.clock)?;
        if let Some(location) = request.location {
            draft = draft.with_location(location);
        }
        if let Some(amount) = request.expected_revenue {
            draft = draft.with_expected_revenue(amount)?;
        }
        draft = draft.with_assignees(request.assignee_ids);

        let task = self.repository.create(&draft).await?;
        self.log
            .record(
                &Topic::for_task(task.id()),
                ActivityPayload::TaskCreated {
                    name: task.name().to_owned(),
                },
                Some(actor.user_id()),
            )
            .await?;
        tracing::info!(task_id = %task.id(), "task created");
        Ok(task)
    }

    /// Releases a prepared task to the field.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] unless the task is
    /// currently preparing, and [`TaskDomainError::AdminRequired`] for
    /// non-admin actors.
    pub async fn mark_ready(&self, actor: &Actor, task_id: TaskId) -> TaskLifecycleResult<Task> {
        let task = self.load(task_id).await?;
        let updated = self
            .machine
            .transition(&task, actor, TaskStatus::Ready, TransitionTrigger::AdminAction)
            .await?;
        Ok(updated)
    }

    /// Replaces the assignee set.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AdminRequired`] for non-admin actors and
    /// [`TaskLifecycleError::TaskNotFound`] for unknown tasks.
    pub async fn update_assignees(
        &self,
        actor: &Actor,
        task_id: TaskId,
        assignee_ids: Vec<UserId>,
    ) -> TaskLifecycleResult<Task> {
        require_admin(actor)?;
        let mut task = self.load(task_id).await?;
        task.set_assignees(assignee_ids, &*self.clock);
        self.repository.update_details(&task).await?;
        self.log
            .record(
                &Topic::for_task(task_id),
                ActivityPayload::TaskAssigneesUpdated {
                    assignee_ids: task.assignee_ids().iter().copied().collect(),
                },
                Some(actor.user_id()),
            )
            .await?;
        tracing::info!(task_id = %task_id, "assignees updated");
        Ok(task)
    }

    /// Sets or replaces the expected revenue target.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NegativeExpectedRevenue`] for amounts
    /// below zero and [`TaskDomainError::AdminRequired`] for non-admin
    /// actors.
    pub async fn set_expected_revenue(
        &self,
        actor: &Actor,
        task_id: TaskId,
        amount: Decimal,
    ) -> TaskLifecycleResult<Task> {
        require_admin(actor)?;
        let mut task = self.load(task_id).await?;
        let previous = task.expected_revenue();
        task.set_expected_revenue(amount, &*self.clock)?;
        self.repository.update_details(&task).await?;
        self.log
            .record(
                &Topic::for_task(task_id),
                ActivityPayload::TaskExpectedRevenueUpdated {
                    previous,
                    expected_revenue: amount,
                },
                Some(actor.user_id()),
            )
            .await?;
        tracing::info!(task_id = %task_id, "expected revenue updated");
        Ok(task)
    }

    /// Corrects the current payment's amount.
    ///
    /// The original record keeps its identifier, collector, and collection
    /// timestamp; the activity log preserves the previous amount.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::PaymentNotFound`] when the task has no
    /// payment to correct.
    pub async fn correct_payment(
        &self,
        actor: &Actor,
        task_id: TaskId,
        amount: Decimal,
    ) -> TaskLifecycleResult<Payment> {
        require_admin(actor)?;
        let current = self
            .payments
            .find_by_task(task_id)
            .await?
            .ok_or(TaskLifecycleError::PaymentNotFound(task_id))?;
        let corrected = current.corrected(amount)?;
        self.payments.replace(&corrected).await?;
        self.log
            .record(
                &Topic::for_task(task_id),
                ActivityPayload::PaymentUpdated {
                    payment_id: corrected.id(),
                    previous_amount: current.amount(),
                    amount,
                },
                Some(actor.user_id()),
            )
            .await?;
        tracing::info!(task_id = %task_id, payment_id = %corrected.id(), "payment corrected");
        Ok(corrected)
    }

    /// Stores attachments against a task outside of check-in/out.
    ///
    /// Admins may always upload; workers only when assigned.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotAssigned`] when a worker uploads to a
    /// task they are not assigned to.
    pub async fn upload_attachments(
        &self,
        actor: &Actor,
        task_id: TaskId,
        files: Vec<FileUpload>,
    ) -> TaskLifecycleResult<Vec<StoredAttachment>> {
        let task = self.load(task_id).await?;
        if !actor.is_admin() && !task.is_assigned(actor.user_id()) {
            return Err(TaskDomainError::NotAssigned {
                task_id,
                user_id: actor.user_id(),
            }
            .into());
        }

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let attachment = self
                .storage
                .store(AttachmentUpload {
                    bytes: file.bytes,
                    original_filename: file.original_filename,
                    mime_type: file.mime_type,
                    uploaded_by: actor.user_id(),
                })
                .await?;
            stored.push(attachment);
        }
        self.log
            .record(
                &Topic::for_task(task_id),
                ActivityPayload::TaskAttachmentsUploaded {
                    attachments: stored
                        .iter()
                        .map(|attachment| AttachmentRef::from(attachment.id))
                        .collect(),
                },
                Some(actor.user_id()),
            )
            .await?;
        Ok(stored)
    }

    /// Soft-deletes an attachment.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentStoreError::NotFound`] for unknown attachments
    /// and [`TaskDomainError::AdminRequired`] for non-admin actors.
    pub async fn delete_attachment(
        &self,
        actor: &Actor,
        task_id: TaskId,
        attachment_id: AttachmentId,
    ) -> TaskLifecycleResult<()> {
        require_admin(actor)?;
        self.load(task_id).await?;
        self.storage.delete(attachment_id).await?;
        self.log
            .record(
                &Topic::for_task(task_id),
                ActivityPayload::AttachmentDeleted { attachment_id },
                Some(actor.user_id()),
            )
            .await?;
        tracing::info!(task_id = %task_id, attachment_id = %attachment_id, "attachment deleted");
        Ok(())
    }

    /// Returns a task with its current payment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when the task does not
    /// exist.
    pub async fn get_task(&self, task_id: TaskId) -> TaskLifecycleResult<TaskDetails> {
        let task = self.load(task_id).await?;
        let payment = self.payments.find_by_task(task_id).await?;
        Ok(TaskDetails { task, payment })
    }

    async fn load(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::TaskNotFound(task_id))
    }
}

fn require_admin(actor: &Actor) -> Result<(), TaskDomainError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(TaskDomainError::AdminRequired {
            user_id: actor.user_id(),
        })
    }
}
