//! Service tests for the admin-facing lifecycle operations.

use crate::activity::{
    adapters::memory::InMemoryActivityLog,
    domain::{ActivityAction, ActivityPayload, Topic},
    ports::ActivityLog,
};
use crate::task::{
    adapters::memory::{
        InMemoryAttachmentStore, InMemoryPaymentRepository, InMemoryTaskRepository,
    },
    domain::{
        Actor, GeoPoint, Payment, Role, Task, TaskDomainError, TaskId, TaskLocation, TaskStatus,
        UserId,
    },
    ports::{AttachmentStore, PaymentRepository},
    services::{CreateTaskRequest, FileUpload, TaskLifecycleError, TaskLifecycleService},
};
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use std::sync::Arc;

type TestService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryPaymentRepository,
    InMemoryAttachmentStore,
    InMemoryActivityLog,
    DefaultClock,
>;

struct Harness {
    payments: Arc<InMemoryPaymentRepository>,
    storage: Arc<InMemoryAttachmentStore>,
    log: Arc<InMemoryActivityLog>,
    service: TestService,
}

#[fixture]
fn harness() -> Harness {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let payments = Arc::new(InMemoryPaymentRepository::new());
    let storage = Arc::new(InMemoryAttachmentStore::new());
    let log = Arc::new(InMemoryActivityLog::new());
    let service = TaskLifecycleService::new(
        repository,
        Arc::clone(&payments),
        Arc::clone(&storage),
        Arc::clone(&log),
        Arc::new(DefaultClock),
    );
    Harness {
        payments,
        storage,
        log,
        service,
    }
}

impl Harness {
    async fn actions(&self, task_id: TaskId) -> eyre::Result<Vec<ActivityAction>> {
        let entries = self.log.query(&Topic::for_task(task_id)).await?;
        Ok(entries.iter().map(|activity| activity.action()).collect())
    }

    async fn create_task(&self, admin: &Actor) -> eyre::Result<Task> {
        let request = CreateTaskRequest::new("Annual boiler service")
            .with_location(TaskLocation::new(GeoPoint::new(52.37, 4.89)?).with_name("Depot"))
            .with_expected_revenue(Decimal::new(45_000, 2))
            .with_assignees([UserId::new()]);
        Ok(self.service.create_task(admin, request).await?)
    }
}

fn admin() -> Actor {
    Actor::new(UserId::new(), Role::Admin)
}

fn worker() -> Actor {
    Actor::new(UserId::new(), Role::Worker)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_starts_preparing_and_logs_creation(harness: Harness) -> eyre::Result<()> {
    let actor = admin();
    let task = harness.create_task(&actor).await?;

    ensure!(task.status() == TaskStatus::Preparing);
    ensure!(task.name() == "Annual boiler service");
    ensure!(task.expected_revenue() == Some(Decimal::new(45_000, 2)));
    ensure!(task.assignee_ids().len() == 1);

    let actions = harness.actions(task.id()).await?;
    ensure!(actions == vec![ActivityAction::TaskCreated]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_rejects_worker(harness: Harness) {
    let actor = worker();
    let result = harness
        .service
        .create_task(&actor, CreateTaskRequest::new("Not yours"))
        .await;

    assert!(matches!(
        result,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::AdminRequired { .. }
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_rejects_blank_name(harness: Harness) {
    let actor = admin();
    let result = harness
        .service
        .create_task(&actor, CreateTaskRequest::new("   "))
        .await;

    assert!(matches!(
        result,
        Err(TaskLifecycleError::Domain(TaskDomainError::EmptyTaskName))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mark_ready_releases_task_and_logs_transition(harness: Harness) -> eyre::Result<()> {
    let actor = admin();
    let task = harness.create_task(&actor).await?;

    let updated = harness.service.mark_ready(&actor, task.id()).await?;

    ensure!(updated.status() == TaskStatus::Ready);
    let actions = harness.actions(task.id()).await?;
    ensure!(
        actions
            == vec![
                ActivityAction::TaskCreated,
                ActivityAction::TaskStatusUpdated,
            ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mark_ready_twice_is_an_invalid_transition(harness: Harness) -> eyre::Result<()> {
    let actor = admin();
    let task = harness.create_task(&actor).await?;
    harness.service.mark_ready(&actor, task.id()).await?;

    let result = harness.service.mark_ready(&actor, task.id()).await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::InvalidTransition { .. }
        ))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_assignees_replaces_the_set_and_logs(harness: Harness) -> eyre::Result<()> {
    let actor = admin();
    let task = harness.create_task(&actor).await?;
    let replacement = UserId::new();

    let updated = harness
        .service
        .update_assignees(&actor, task.id(), vec![replacement])
        .await?;

    ensure!(updated.assignee_ids().len() == 1);
    ensure!(updated.is_assigned(replacement));

    let entries = harness.log.query(&Topic::for_task(task.id())).await?;
    let Some(last) = entries.last() else {
        bail!("expected an assignee activity");
    };
    let ActivityPayload::TaskAssigneesUpdated { assignee_ids } = last.payload() else {
        bail!("expected TaskAssigneesUpdated, got {last:?}");
    };
    ensure!(assignee_ids == &vec![replacement]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn set_expected_revenue_logs_previous_target(harness: Harness) -> eyre::Result<()> {
    let actor = admin();
    let task = harness.create_task(&actor).await?;

    let updated = harness
        .service
        .set_expected_revenue(&actor, task.id(), Decimal::new(60_000, 2))
        .await?;

    ensure!(updated.expected_revenue() == Some(Decimal::new(60_000, 2)));

    let entries = harness.log.query(&Topic::for_task(task.id())).await?;
    let Some(last) = entries.last() else {
        bail!("expected a revenue activity");
    };
    let ActivityPayload::TaskExpectedRevenueUpdated {
        previous,
        expected_revenue,
    } = last.payload()
    else {
        bail!("expected TaskExpectedRevenueUpdated, got {last:?}");
    };
    ensure!(*previous == Some(Decimal::new(45_000, 2)));
    ensure!(*expected_revenue == Decimal::new(60_000, 2));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn set_expected_revenue_rejects_negative_amount(harness: Harness) -> eyre::Result<()> {
    let actor = admin();
    let task = harness.create_task(&actor).await?;

    let result = harness
        .service
        .set_expected_revenue(&actor, task.id(), Decimal::new(-1, 2))
        .await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::NegativeExpectedRevenue(_)
        ))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn correct_payment_replaces_amount_and_logs_both_values(
    harness: Harness,
) -> eyre::Result<()> {
    let actor = admin();
    let task = harness.create_task(&actor).await?;
    let original = Payment::new(
        task.id(),
        Decimal::new(45_000, 2),
        UserId::new(),
        &DefaultClock,
    )?;
    harness.payments.store(&original).await?;

    let corrected = harness
        .service
        .correct_payment(&actor, task.id(), Decimal::new(47_500, 2))
        .await?;

    ensure!(corrected.id() == original.id());
    ensure!(corrected.amount() == Decimal::new(47_500, 2));
    let stored = harness.payments.find_by_task(task.id()).await?;
    ensure!(stored.as_ref().map(Payment::amount) == Some(Decimal::new(47_500, 2)));

    let entries = harness.log.query(&Topic::for_task(task.id())).await?;
    let Some(last) = entries.last() else {
        bail!("expected a payment activity");
    };
    let ActivityPayload::PaymentUpdated {
        previous_amount,
        amount,
        ..
    } = last.payload()
    else {
        bail!("expected PaymentUpdated, got {last:?}");
    };
    ensure!(*previous_amount == Decimal::new(45_000, 2));
    ensure!(*amount == Decimal::new(47_500, 2));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn correct_payment_without_payment_reports_not_found(harness: Harness) -> eyre::Result<()> {
    let actor = admin();
    let task = harness.create_task(&actor).await?;

    let result = harness
        .service
        .correct_payment(&actor, task.id(), Decimal::new(100, 2))
        .await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::PaymentNotFound(_))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn upload_attachments_stores_files_and_logs(harness: Harness) -> eyre::Result<()> {
    let actor = admin();
    let task = harness.create_task(&actor).await?;

    let stored = harness
        .service
        .upload_attachments(
            &actor,
            task.id(),
            vec![FileUpload {
                original_filename: "quote.pdf".to_owned(),
                mime_type: "application/pdf".to_owned(),
                bytes: vec![0x25, 0x50, 0x44, 0x46],
            }],
        )
        .await?;

    ensure!(stored.len() == 1);
    let ids: Vec<_> = stored.iter().map(|attachment| attachment.id).collect();
    let resolved = harness.storage.resolve(&ids).await?;
    ensure!(resolved.len() == 1);

    let actions = harness.actions(task.id()).await?;
    ensure!(actions.contains(&ActivityAction::TaskAttachmentsUploaded));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unassigned_worker_cannot_upload_attachments(harness: Harness) -> eyre::Result<()> {
    let actor = admin();
    let task = harness.create_task(&actor).await?;

    let result = harness
        .service
        .upload_attachments(
            &worker(),
            task.id(),
            vec![FileUpload {
                original_filename: "note.txt".to_owned(),
                mime_type: "text/plain".to_owned(),
                bytes: b"hello".to_vec(),
            }],
        )
        .await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::NotAssigned { .. }
        ))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_attachment_hides_it_from_resolution(harness: Harness) -> eyre::Result<()> {
    let actor = admin();
    let task = harness.create_task(&actor).await?;
    let stored = harness
        .service
        .upload_attachments(
            &actor,
            task.id(),
            vec![FileUpload {
                original_filename: "before.jpg".to_owned(),
                mime_type: "image/jpeg".to_owned(),
                bytes: vec![1, 2, 3],
            }],
        )
        .await?;
    let Some(attachment) = stored.first() else {
        bail!("expected a stored attachment");
    };

    harness
        .service
        .delete_attachment(&actor, task.id(), attachment.id)
        .await?;

    // Soft-deleted ids silently vanish from resolution.
    let resolved = harness.storage.resolve(&[attachment.id]).await?;
    ensure!(resolved.is_empty());
    let actions = harness.actions(task.id()).await?;
    ensure!(actions.contains(&ActivityAction::AttachmentDeleted));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_task_returns_task_with_payment(harness: Harness) -> eyre::Result<()> {
    let actor = admin();
    let task = harness.create_task(&actor).await?;
    let payment = Payment::new(
        task.id(),
        Decimal::new(45_000, 2),
        UserId::new(),
        &DefaultClock,
    )?;
    harness.payments.store(&payment).await?;

    let details = harness.service.get_task(task.id()).await?;

    ensure!(details.task.id() == task.id());
    ensure!(details.payment.as_ref().map(Payment::id) == Some(payment.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_task_reports_missing_task(harness: Harness) -> eyre::Result<()> {
    let result = harness.service.get_task(TaskId::from_raw(999)).await;
    ensure!(matches!(result, Err(TaskLifecycleError::TaskNotFound(_))));
    Ok(())
}
