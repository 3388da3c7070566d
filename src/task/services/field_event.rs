//! Check-in / check-out orchestration.
//!
//! The two field events follow the same shape: validate input, load and
//! authorize, verify the GPS fix, persist evidence (and, at check-out, the
//! reconciled payment), advance the status through the state machine, then
//! append the event activities. The status transition comes last among the
//! writes that matter to lifecycle state, so a failure before it aborts with
//! the task unchanged.

use crate::activity::{
    domain::{ActivityPayload, Topic},
    ports::{ActivityLog, ActivityLogError},
};
use crate::task::{
    domain::{
        Actor, AttachmentRef, GeoFix, GeoPoint, Payment, Task, TaskDomainError, TaskId,
        TaskLocation, TaskStatus, TransitionTrigger, geo, mismatch_warning, reconcile,
    },
    ports::{
        AttachmentStore, AttachmentStoreError, AttachmentUpload, PaymentRepository,
        PaymentRepositoryError, StoredAttachment, TaskRepository, TaskRepositoryError,
    },
    services::{TaskStateMachine, TaskStateMachineError},
};
use mockable::Clock;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// A file part received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Original client-side filename.
    pub original_filename: String,
    /// Client-reported MIME type.
    pub mime_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// Check-in input as received from the transport layer.
///
/// Coordinates arrive as decimal strings (multipart form fields); parsing
/// them here keeps malformed input in the validation error class.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckInRequest {
    task_id: TaskId,
    latitude: String,
    longitude: String,
    accuracy: Option<String>,
    notes: Option<String>,
    files: Vec<FileUpload>,
}

impl CheckInRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            latitude: latitude.into(),
            longitude: longitude.into(),
            accuracy: None,
            notes: None,
            files: Vec::new(),
        }
    }

    /// Sets the reported GPS accuracy radius.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: impl Into<String>) -> Self {
        self.accuracy = Some(accuracy.into());
        self
    }

    /// Sets worker-supplied notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Adds evidence files.
    #[must_use]
    pub fn with_files(mut self, files: impl IntoIterator<Item = FileUpload>) -> Self {
        self.files.extend(files);
        self
    }
}

/// Check-out input: the check-in shape plus optional payment fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutRequest {
    base: CheckInRequest,
    payment_collected: bool,
    payment_amount: Option<String>,
    payment_notes: Option<String>,
    invoice_file: Option<FileUpload>,
}

impl CheckOutRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self {
            base: CheckInRequest::new(task_id, latitude, longitude),
            payment_collected: false,
            payment_amount: None,
            payment_notes: None,
            invoice_file: None,
        }
    }

    /// Sets the reported GPS accuracy radius.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: impl Into<String>) -> Self {
        self.base = self.base.with_accuracy(accuracy);
        self
    }

    /// Sets worker-supplied notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.base = self.base.with_notes(notes);
        self
    }

    /// Adds evidence files.
    #[must_use]
    pub fn with_files(mut self, files: impl IntoIterator<Item = FileUpload>) -> Self {
        self.base = self.base.with_files(files);
        self
    }

    /// Marks the payment as collected.
    #[must_use]
    pub const fn with_payment_collected(mut self) -> Self {
        self.payment_collected = true;
        self
    }

    /// Sets the collected amount as a decimal string.
    #[must_use]
    pub fn with_payment_amount(mut self, amount: impl Into<String>) -> Self {
        self.payment_amount = Some(amount.into());
        self
    }

    /// Sets payment notes.
    #[must_use]
    pub fn with_payment_notes(mut self, notes: impl Into<String>) -> Self {
        self.payment_notes = Some(notes.into());
        self
    }

    /// Attaches the invoice file.
    #[must_use]
    pub fn with_invoice_file(mut self, file: FileUpload) -> Self {
        self.invoice_file = Some(file);
        self
    }
}

/// Successful check-in result.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckInOutcome {
    /// The task after the transition.
    pub task: Task,
    /// Advisory warnings surfaced to the actor.
    pub warnings: Vec<String>,
}

/// Successful check-out result.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutOutcome {
    /// The task after the transition.
    pub task: Task,
    /// Advisory warnings surfaced to the actor.
    pub warnings: Vec<String>,
    /// The created payment, when one was collected.
    pub payment: Option<Payment>,
}

/// Errors raised by the field-event handlers.
#[derive(Debug, Error)]
pub enum FieldEventError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A form field failed to parse.
    #[error("invalid {field} value '{value}'")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected raw value.
        value: String,
    },

    /// A payment amount arrived without the collected flag.
    #[error("paymentAmount requires paymentCollected")]
    PaymentAmountWithoutCollected,

    /// The collected flag arrived without an amount.
    #[error("payment amount is required when payment is collected")]
    MissingPaymentAmount,

    /// An invoice file arrived without the collected flag.
    #[error("invoiceFile requires paymentCollected")]
    InvoiceWithoutCollected,

    /// Domain rules rejected the operation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Task persistence failed or the transition lost a race.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// Payment persistence failed.
    #[error(transparent)]
    Payments(#[from] PaymentRepositoryError),

    /// The storage collaborator rejected an upload.
    #[error(transparent)]
    Storage(#[from] AttachmentStoreError),

    /// The activity log could not be appended.
    #[error(transparent)]
    Log(#[from] ActivityLogError),
}

impl From<TaskStateMachineError> for FieldEventError {
    fn from(err: TaskStateMachineError) -> Self {
        match err {
            TaskStateMachineError::Domain(inner) => Self::Domain(inner),
            TaskStateMachineError::Repository(inner) => Self::Repository(inner),
            TaskStateMachineError::Log(inner) => Self::Log(inner),
        }
    }
}

/// Result type for field-event operations.
pub type FieldEventResult<T> = Result<T, FieldEventError>;

/// Orchestrates worker check-in and check-out.
pub struct FieldEventService<R, P, S, L, C>
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

impl<R, P, S, L, C> Clone for FieldEventService<R, P, S, L, C>
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

impl<R, P, S, L, C> FieldEventService<R, P, S, L, C>
where
    R: TaskRepository,
    P: PaymentRepository,
    S: AttachmentStore,
    L: ActivityLog,
    C: Clock + Send + Sync,
{
    /// Creates a new field-event service.
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

    /// Worker check-in: verifies the fix, stores evidence, and moves the
    /// task to [`TaskStatus::InProgress`].
    ///
    /// # Errors
    ///
    /// Returns [`FieldEventError`] per the taxonomy: validation and
    /// authorization failures occur before any side effect; a lost
    /// transition race surfaces as
    /// [`TaskRepositoryError::StatusConflict`].
    pub async fn check_in(
        &self,
        actor: &Actor,
        request: CheckInRequest,
    ) -> FieldEventResult<CheckInOutcome> {
        let fix = parse_fix(&request.latitude, &request.longitude, request.accuracy.as_deref())?;
        let task = self.load(request.task_id).await?;
        task.authorize_transition(actor, TaskStatus::InProgress, TransitionTrigger::CheckIn)?;

        let verification = geo::verify(&fix, task.location().map(TaskLocation::point));
        let attachments = self.store_files(actor, request.files).await?;

        let updated = self
            .machine
            .transition(&task, actor, TaskStatus::InProgress, TransitionTrigger::CheckIn)
            .await?;
        self.log
            .record(
                &Topic::for_task(task.id()),
                ActivityPayload::TaskCheckedIn {
                    distance_from_task: verification.distance_meters(),
                    notes: request.notes,
                    warnings: verification.warnings().to_vec(),
                    attachments,
                },
                Some(actor.user_id()),
            )
            .await?;
        tracing::info!(task_id = %task.id(), user_id = %actor.user_id(), "worker checked in");

        Ok(CheckInOutcome {
            task: updated,
            warnings: verification.into_warnings(),
        })
    }

    /// Worker check-out: verifies the fix, stores evidence, optionally
    /// records a reconciled payment, and moves the task to
    /// [`TaskStatus::Completed`].
    ///
    /// A reconciliation mismatch is advisory: it adds a warning but never
    /// blocks the transition or the payment.
    ///
    /// # Errors
    ///
    /// As for [`FieldEventService::check_in`], plus
    /// [`FieldEventError::PaymentAmountWithoutCollected`] and
    /// [`FieldEventError::MissingPaymentAmount`] for inconsistent payment
    /// fields.
    pub async fn check_out(
        &self,
        actor: &Actor,
        request: CheckOutRequest,
    ) -> FieldEventResult<CheckOutOutcome> {
        let CheckOutRequest {
            base,
            payment_collected,
            payment_amount,
            payment_notes,
            invoice_file,
        } = request;
        let collected_amount = validate_payment_fields(payment_collected, payment_amount)?;
        if invoice_file.is_some() && !payment_collected {
            return Err(FieldEventError::InvoiceWithoutCollected);
        }
        let fix = parse_fix(&base.latitude, &base.longitude, base.accuracy.as_deref())?;
        let task = self.load(base.task_id).await?;
        task.authorize_transition(actor, TaskStatus::Completed, TransitionTrigger::CheckOut)?;

        let verification = geo::verify(&fix, task.location().map(TaskLocation::point));
        let mut warnings = verification.warnings().to_vec();
        let attachments = self.store_files(actor, base.files).await?;
        let invoice_id = match invoice_file {
            Some(file) => Some(self.store_file(actor, file).await?.id),
            None => None,
        };

        let mut payment = None;
        let mut payment_mismatch = false;
        if let Some(amount) = collected_amount {
            let reconciliation = reconcile(task.expected_revenue(), amount);
            payment_mismatch = reconciliation.mismatch();
            if payment_mismatch {
                if let Some(expected) = task.expected_revenue() {
                    warnings.push(mismatch_warning(expected, amount));
                }
            }

            let mut record = Payment::new(task.id(), amount, actor.user_id(), &*self.clock)?;
            if let Some(notes) = payment_notes {
                record = record.with_notes(notes);
            }
            if let Some(id) = invoice_id {
                record = record.with_invoice_attachment(id);
            }
            self.payments.store(&record).await?;
            payment = Some(record);
        }

        let updated = self
            .machine
            .transition(&task, actor, TaskStatus::Completed, TransitionTrigger::CheckOut)
            .await?;

        let topic = Topic::for_task(task.id());
        if let Some(record) = &payment {
            self.log
                .record(
                    &topic,
                    ActivityPayload::PaymentCollected {
                        payment_id: record.id(),
                        amount: record.amount(),
                        mismatch: payment_mismatch,
                    },
                    Some(actor.user_id()),
                )
                .await?;
        }

        self.log
            .record(
                &topic,
                ActivityPayload::TaskCheckedOut {
                    distance_from_task: verification.distance_meters(),
                    notes: base.notes,
                    warnings: warnings.clone(),
                    attachments,
                },
                Some(actor.user_id()),
            )
            .await?;
        tracing::info!(task_id = %task.id(), user_id = %actor.user_id(), "worker checked out");

        Ok(CheckOutOutcome {
            task: updated,
            warnings,
            payment,
        })
    }

    async fn load(&self, task_id: TaskId) -> FieldEventResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(FieldEventError::TaskNotFound(task_id))
    }

    /// Stores the given files one by one; any failure aborts the whole
    /// operation. Bytes already handed to the collaborator are left to its
    /// garbage collection.
    async fn store_files(
        &self,
        actor: &Actor,
        files: Vec<FileUpload>,
    ) -> FieldEventResult<Vec<AttachmentRef>> {
        let mut refs = Vec::with_capacity(files.len());
        for file in files {
            let stored = self.store_file(actor, file).await?;
            refs.push(AttachmentRef::from(stored.id));
        }
        Ok(refs)
    }

    async fn store_file(
        &self,
        actor: &Actor,
        file: FileUpload,
    ) -> FieldEventResult<StoredAttachment> {
        Ok(self
            .storage
            .store(AttachmentUpload {
                bytes: file.bytes,
                original_filename: file.original_filename,
                mime_type: file.mime_type,
                uploaded_by: actor.user_id(),
            })
            .await?)
    }
}

fn validate_payment_fields(
    payment_collected: bool,
    payment_amount: Option<String>,
) -> FieldEventResult<Option<Decimal>> {
    match (payment_collected, payment_amount) {
        (false, None) => Ok(None),
        (false, Some(_)) => Err(FieldEventError::PaymentAmountWithoutCollected),
        (true, None) => Err(FieldEventError::MissingPaymentAmount),
        (true, Some(raw)) => {
            let amount = Decimal::from_str(raw.trim()).map_err(|_| {
                FieldEventError::InvalidField {
                    field: "paymentAmount",
                    value: raw.clone(),
                }
            })?;
            if amount <= Decimal::ZERO {
                return Err(TaskDomainError::NonPositivePaymentAmount(amount).into());
            }
            Ok(Some(amount))
        }
    }
}

fn parse_fix(
    latitude: &str,
    longitude: &str,
    accuracy: Option<&str>,
) -> FieldEventResult<GeoFix> {
    let lat = parse_coordinate("latitude", latitude)?;
    let lng = parse_coordinate("longitude", longitude)?;
    let point = GeoPoint::new(lat, lng)?;
    let mut fix = GeoFix::new(point);
    if let Some(raw) = accuracy {
        let meters = parse_coordinate("accuracy", raw)?;
        fix = fix.with_accuracy(meters)?;
    }
    Ok(fix)
}

fn parse_coordinate(field: &'static str, raw: &str) -> FieldEventResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| FieldEventError::InvalidField {
            field,
            value: raw.to_owned(),
        })
}
