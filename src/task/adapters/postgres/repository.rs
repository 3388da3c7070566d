//! `PostgreSQL` repositories for task and payment storage.

use super::{
    models::{NewTaskRow, PaymentRow, TaskRow},
    schema::{payments, tasks},
};
use crate::task::{
    domain::{
        AttachmentId, Payment, PaymentId, PersistedPaymentData, PersistedTaskData, Task,
        TaskDraft, TaskId, TaskLocation, TaskStatus, UserId,
    },
    ports::{
        PaymentRepository, PaymentRepositoryError, PaymentRepositoryResult, TaskRepository,
        TaskRepositoryError, TaskRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
///
/// Status transitions are a single conditional `UPDATE … WHERE id = ? AND
/// status = ?`; the database's atomicity linearizes concurrent transitions
/// without any lock primitive.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, draft: &TaskDraft) -> TaskRepositoryResult<Task> {
        let new_row = draft_to_new_row(draft)?;
        self.run_blocking(move |connection| {
            let row = diesel::insert_into(tasks::table)
                .values(&new_row)
                .get_result::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            row_to_task(row)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.value()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn update_details(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let location = task
            .location()
            .map(serde_json::to_value)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?;
        let expected_revenue = task.expected_revenue();
        let assignee_ids: Vec<uuid::Uuid> = task
            .assignee_ids()
            .iter()
            .copied()
            .map(UserId::into_inner)
            .collect();
        let updated_at = task.updated_at();

        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.filter(tasks::id.eq(task_id.value())))
                .set((
                    tasks::location.eq(location),
                    tasks::expected_revenue.eq(expected_revenue),
                    tasks::assignee_ids.eq(assignee_ids),
                    tasks::updated_at.eq(updated_at),
                ))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn transition_status(
        &self,
        id: TaskId,
        expected: TaskStatus,
        next: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                tasks::table.filter(
                    tasks::id
                        .eq(id.value())
                        .and(tasks::status.eq(expected.as_str())),
                ),
            )
            .set((
                tasks::status.eq(next.as_str()),
                tasks::updated_at.eq(updated_at),
            ))
            .get_result::<TaskRow>(connection)
            .optional()
            .map_err(TaskRepositoryError::persistence)?;

            match updated {
                Some(row) => row_to_task(row),
                // Zero rows: distinguish a missing task from a lost race by
                // re-reading the current status.
                None => {
                    let row = tasks::table
                        .filter(tasks::id.eq(id.value()))
                        .select(TaskRow::as_select())
                        .first::<TaskRow>(connection)
                        .optional()
                        .map_err(TaskRepositoryError::persistence)?
                        .ok_or(TaskRepositoryError::NotFound(id))?;
                    let actual = TaskStatus::try_from(row.status.as_str())
                        .map_err(TaskRepositoryError::persistence)?;
                    Err(TaskRepositoryError::StatusConflict {
                        task_id: id,
                        expected,
                        actual,
                    })
                }
            }
        })
        .await
    }
}

fn draft_to_new_row(draft: &TaskDraft) -> TaskRepositoryResult<NewTaskRow> {
    let location = draft
        .location()
        .map(serde_json::to_value)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    Ok(NewTaskRow {
        name: draft.name().to_owned(),
        status: TaskStatus::Preparing.as_str().to_owned(),
        location,
        expected_revenue: draft.expected_revenue(),
        assignee_ids: draft
            .assignee_ids()
            .iter()
            .copied()
            .map(UserId::into_inner)
            .collect(),
        created_at: draft.created_at(),
        updated_at: draft.created_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        name,
        status: persisted_status,
        location: persisted_location,
        expected_revenue,
        assignee_ids,
        created_at,
        updated_at,
    } = row;

    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let location = persisted_location
        .map(serde_json::from_value::<TaskLocation>)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_raw(id),
        name,
        status,
        location,
        expected_revenue,
        assignee_ids: assignee_ids.into_iter().map(UserId::from_uuid).collect(),
        created_at,
        updated_at,
    }))
}

/// `PostgreSQL`-backed payment repository.
#[derive(Debug, Clone)]
pub struct PostgresPaymentRepository {
    pool: TaskPgPool,
}

impl PostgresPaymentRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> PaymentRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> PaymentRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(PaymentRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(PaymentRepositoryError::persistence)?
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn store(&self, payment: &Payment) -> PaymentRepositoryResult<()> {
        let task_id = payment.task_id();
        let row = payment_to_row(payment);
        self.run_blocking(move |connection| {
            diesel::insert_into(payments::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        PaymentRepositoryError::DuplicatePayment(task_id)
                    }
                    _ => PaymentRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn replace(&self, payment: &Payment) -> PaymentRepositoryResult<()> {
        let task_id = payment.task_id();
        let row = payment_to_row(payment);
        self.run_blocking(move |connection| {
            let affected =
                diesel::update(payments::table.filter(payments::task_id.eq(task_id.value())))
                    .set((
                        payments::amount.eq(row.amount),
                        payments::notes.eq(row.notes.clone()),
                    ))
                    .execute(connection)
                    .map_err(PaymentRepositoryError::persistence)?;
            if affected == 0 {
                return Err(PaymentRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_task(&self, task_id: TaskId) -> PaymentRepositoryResult<Option<Payment>> {
        self.run_blocking(move |connection| {
            let row = payments::table
                .filter(payments::task_id.eq(task_id.value()))
                .select(PaymentRow::as_select())
                .first::<PaymentRow>(connection)
                .optional()
                .map_err(PaymentRepositoryError::persistence)?;
            Ok(row.map(row_to_payment))
        })
        .await
    }
}

fn payment_to_row(payment: &Payment) -> PaymentRow {
    PaymentRow {
        id: payment.id().into_inner(),
        task_id: payment.task_id().value(),
        amount: payment.amount(),
        collected_by: payment.collected_by().into_inner(),
        collected_at: payment.collected_at(),
        invoice_attachment_id: payment.invoice_attachment_id().map(AttachmentId::into_inner),
        notes: payment.notes().map(str::to_owned),
    }
}

fn row_to_payment(row: PaymentRow) -> Payment {
    Payment::from_persisted(PersistedPaymentData {
        id: PaymentId::from_uuid(row.id),
        task_id: TaskId::from_raw(row.task_id),
        amount: row.amount,
        collected_by: UserId::from_uuid(row.collected_by),
        collected_at: row.collected_at,
        invoice_attachment_id: row.invoice_attachment_id.map(AttachmentId::from_uuid),
        notes: row.notes,
    })
}
