//! HTTP routes and handlers.

use crate::activity::{
    domain::{Activity, Topic},
    ports::ActivityLog,
    projection::{FeedOptions, project},
};
use crate::api::{
    error::ApiError,
    extract::{CallerIdentity, read_check_in, read_check_out, read_uploads},
};
use crate::task::{
    domain::{
        AttachmentId, GeoPoint, Payment, Task, TaskId, TaskLocation, TaskStatus, UserId,
    },
    ports::{AttachmentStore, PaymentRepository, StoredAttachment, TaskRepository},
    services::{CreateTaskRequest, FieldEventService, TaskLifecycleService},
};
use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Shared handler state: the two services plus direct log access for the
/// activity query endpoint.
pub struct AppState<R, P, S, L, C>
where
    R: TaskRepository,
    P: PaymentRepository,
    S: AttachmentStore,
    L: ActivityLog,
    C: Clock + Send + Sync,
{
    field_events: FieldEventService<R, P, S, L, C>,
    lifecycle: TaskLifecycleService<R, P, S, L, C>,
    log: Arc<L>,
}

impl<R, P, S, L, C> Clone for AppState<R, P, S, L, C>
where
    R: TaskRepository,
    P: PaymentRepository,
    S: AttachmentStore,
    L: ActivityLog,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            field_events: self.field_events.clone(),
            lifecycle: self.lifecycle.clone(),
            log: Arc::clone(&self.log),
        }
    }
}

impl<R, P, S, L, C> AppState<R, P, S, L, C>
where
    R: TaskRepository,
    P: PaymentRepository,
    S: AttachmentStore,
    L: ActivityLog,
    C: Clock + Send + Sync,
{
    /// Wires the services onto the given collaborators.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        payments: Arc<P>,
        storage: Arc<S>,
        log: Arc<L>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            field_events: FieldEventService::new(
                Arc::clone(&repository),
                Arc::clone(&payments),
                Arc::clone(&storage),
                Arc::clone(&log),
                Arc::clone(&clock),
            ),
            lifecycle: TaskLifecycleService::new(
                repository,
                payments,
                storage,
                Arc::clone(&log),
                clock,
            ),
            log,
        }
    }
}

/// Builds the v1 router.
#[must_use]
pub fn router<R, P, S, L, C>(state: AppState<R, P, S, L, C>) -> Router
where
    R: TaskRepository + 'static,
    P: PaymentRepository + 'static,
    S: AttachmentStore + 'static,
    L: ActivityLog + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/v1/task", post(create_task))
        .route("/v1/task/:id", get(get_task))
        .route("/v1/task/:id/ready", post(mark_ready))
        .route("/v1/task/:id/assignees", put(update_assignees))
        .route("/v1/task/:id/expected-revenue", put(set_expected_revenue))
        .route("/v1/task/:id/payment", put(correct_payment))
        .route("/v1/task/:id/attachments", post(upload_attachments))
        .route(
            "/v1/task/:id/attachments/:attachment_id",
            axum::routing::delete(delete_attachment),
        )
        .route("/v1/task/:id/check-in", post(check_in))
        .route("/v1/task/:id/check-out", post(check_out))
        .route("/v1/activity", get(query_activity))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Wire shape of a task location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationBody {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Human-readable address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LocationBody {
    fn into_domain(self) -> Result<TaskLocation, ApiError> {
        let point = GeoPoint::new(self.latitude, self.longitude)
            .map_err(|err| ApiError::unprocessable(err.to_string()))?;
        let mut location = TaskLocation::new(point);
        if let Some(address) = self.address {
            location = location.with_address(address);
        }
        if let Some(name) = self.name {
            location = location.with_name(name);
        }
        Ok(location)
    }

    fn from_domain(location: &TaskLocation) -> Self {
        Self {
            latitude: location.point().latitude(),
            longitude: location.point().longitude(),
            address: location.address().map(ToOwned::to_owned),
            name: location.name().map(ToOwned::to_owned),
        }
    }
}

/// Wire shape of a task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBody {
    /// Task identifier.
    pub id: i64,
    /// Task name.
    pub name: String,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Reference location, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationBody>,
    /// Expected revenue target, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_revenue: Option<Decimal>,
    /// Assigned worker identifiers.
    pub assignee_ids: Vec<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskBody {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().value(),
            name: task.name().to_owned(),
            status: task.status(),
            location: task.location().map(LocationBody::from_domain),
            expected_revenue: task.expected_revenue(),
            assignee_ids: task.assignee_ids().iter().copied().collect(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Wire shape of a payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBody {
    /// Payment identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: i64,
    /// Collected amount.
    pub amount: Decimal,
    /// Collecting worker.
    pub collected_by: UserId,
    /// Collection timestamp.
    pub collected_at: DateTime<Utc>,
    /// Linked invoice attachment, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_attachment_id: Option<AttachmentId>,
    /// Payment notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&Payment> for PaymentBody {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id().into_inner(),
            task_id: payment.task_id().value(),
            amount: payment.amount(),
            collected_by: payment.collected_by(),
            collected_at: payment.collected_at(),
            invoice_attachment_id: payment.invoice_attachment_id(),
            notes: payment.notes().map(ToOwned::to_owned),
        }
    }
}

/// Wire shape of a stored attachment reference.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentBody {
    /// Attachment identifier.
    pub id: AttachmentId,
    /// Collaborator-issued URL.
    pub url: String,
}

impl From<StoredAttachment> for AttachmentBody {
    fn from(stored: StoredAttachment) -> Self {
        Self {
            id: stored.id,
            url: stored.url,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskBody {
    name: String,
    location: Option<LocationBody>,
    expected_revenue: Option<Decimal>,
    #[serde(default)]
    assignee_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssigneesBody {
    assignee_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpectedRevenueBody {
    expected_revenue: Decimal,
}

#[derive(Debug, Deserialize)]
struct PaymentCorrectionBody {
    amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskDetailsBody {
    task: TaskBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment: Option<PaymentBody>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckInBody {
    task: TaskBody,
    warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckOutBody {
    task: TaskBody,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment: Option<PaymentBody>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ActivityView {
    #[default]
    Raw,
    Feed,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityQuery {
    topic: String,
    #[serde(default)]
    view: ActivityView,
    #[serde(default)]
    hide_unimportant: bool,
}

fn user_ids(raw: Vec<Uuid>) -> Vec<UserId> {
    raw.into_iter().map(UserId::from_uuid).collect()
}

async fn create_task<R, P, S, L, C>(
    State(state): State<AppState<R, P, S, L, C>>,
    CallerIdentity(actor): CallerIdentity,
    Json(body): Json<CreateTaskBody>,
) -> Result<(StatusCode, Json<TaskBody>), ApiError>
where
    R: TaskRepository + 'static,
    P: PaymentRepository + 'static,
    S: AttachmentStore + 'static,
    L: ActivityLog + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut request = CreateTaskRequest::new(body.name).with_assignees(user_ids(body.assignee_ids));
    if let Some(location) = body.location {
        request = request.with_location(location.into_domain()?);
    }
    if let Some(amount) = body.expected_revenue {
        request = request.with_expected_revenue(amount);
    }
    let task = state.lifecycle.create_task(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(TaskBody::from(&task))))
}

async fn get_task<R, P, S, L, C>(
    State(state): State<AppState<R, P, S, L, C>>,
    CallerIdentity(_actor): CallerIdentity,
    Path(id): Path<i64>,
) -> Result<Json<TaskDetailsBody>, ApiError>
where
    R: TaskRepository + 'static,
    P: PaymentRepository + 'static,
    S: AttachmentStore + 'static,
    L: ActivityLog + 'static,
    C: Clock + Send + Sync + 'static,
{
    let details = state.lifecycle.get_task(TaskId::from_raw(id)).await?;
    Ok(Json(TaskDetailsBody {
        task: TaskBody::from(&details.task),
        payment: details.payment.as_ref().map(PaymentBody::from),
    }))
}

async fn mark_ready<R, P, S, L, C>(
    State(state): State<AppState<R, P, S, L, C>>,
    CallerIdentity(actor): CallerIdentity,
    Path(id): Path<i64>,
) -> Result<Json<TaskBody>, ApiError>
where
    R: TaskRepository + 'static,
    P: PaymentRepository + 'static,
    S: AttachmentStore + 'static,
    L: ActivityLog + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state
        .lifecycle
        .mark_ready(&actor, TaskId::from_raw(id))
        .await?;
    Ok(Json(TaskBody::from(&task)))
}

async fn update_assignees<R, P, S, L, C>(
    State(state): State<AppState<R, P, S, L, C>>,
    CallerIdentity(actor): CallerIdentity,
    Path(id): Path<i64>,
    Json(body): Json<AssigneesBody>,
) -> Result<Json<TaskBody>, ApiError>
where
    R: TaskRepository + 'static,
    P: PaymentRepository + 'static,
    S: AttachmentStore + 'static,
    L: ActivityLog + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state
        .lifecycle
        .update_assignees(&actor, TaskId::from_raw(id), user_ids(body.assignee_ids))
        .await?;
    Ok(Json(TaskBody::from(&task)))
}

async fn set_expected_revenue<R, P, S, L, C>(
    State(state): State<AppState<R, P, S, L, C>>,
    CallerIdentity(actor): CallerIdentity,
    Path(id): Path<i64>,
    Json(body): Json<ExpectedRevenueBody>,
) -> Result<Json<TaskBody>, ApiError>
where
    R: TaskRepository + 'static,
    P: PaymentRepository + 'static,
    S: AttachmentStore + 'static,
    L: ActivityLog + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task = state
        .lifecycle
        .set_expected_revenue(&actor, TaskId::from_raw(id), body.expected_revenue)
        .await?;
    Ok(Json(TaskBody::from(&task)))
}

async fn correct_payment<R, P, S, L, C>(
    State(state): State<AppState<R, P, S, L, C>>,
    CallerIdentity(actor): CallerIdentity,
    Path(id): Path<i64>,
    Json(body): Json<PaymentCorrectionBody>,
) -> Result<Json<PaymentBody>, ApiError>
where
    R: TaskRepository + 'static,
    P: PaymentRepository + 'static,
    S: AttachmentStore + 'static,
    L: ActivityLog + 'static,
    C: Clock + Send + Sync + 'static,
{
    let payment = state
        .lifecycle
        .correct_payment(&actor, TaskId::from_raw(id), body.amount)
        .await?;
    Ok(Json(PaymentBody::from(&payment)))
}

async fn upload_attachments<R, P, S, L, C>(
    State(state): State<AppState<R, P, S, L, C>>,
    CallerIdentity(actor): CallerIdentity,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<AttachmentBody>>), ApiError>
where
    R: TaskRepository + 'static,
    P: PaymentRepository + 'static,
    S: AttachmentStore + 'static,
    L: ActivityLog + 'static,
    C: Clock + Send + Sync + 'static,
{
    let files = read_uploads(&mut multipart).await?;
    let stored = state
        .lifecycle
        .upload_attachments(&actor, TaskId::from_raw(id), files)
        .await?;
    let bodies = stored.into_iter().map(AttachmentBody::from).collect();
    Ok((StatusCode::CREATED, Json(bodies)))
}

async fn delete_attachment<R, P, S, L, C>(
    State(state): State<AppState<R, P, S, L, C>>,
    CallerIdentity(actor): CallerIdentity,
    Path((id, attachment_id)): Path<(i64, Uuid)>,
) -> Result<StatusCode, ApiError>
where
    R: TaskRepository + 'static,
    P: PaymentRepository + 'static,
    S: AttachmentStore + 'static,
    L: ActivityLog + 'static,
    C: Clock + Send + Sync + 'static,
{
    state
        .lifecycle
        .delete_attachment(
            &actor,
            TaskId::from_raw(id),
            AttachmentId::from_uuid(attachment_id),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn check_in<R, P, S, L, C>(
    State(state): State<AppState<R, P, S, L, C>>,
    CallerIdentity(actor): CallerIdentity,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<CheckInBody>, ApiError>
where
    R: TaskRepository + 'static,
    P: PaymentRepository + 'static,
    S: AttachmentStore + 'static,
    L: ActivityLog + 'static,
    C: Clock + Send + Sync + 'static,
{
    let request = read_check_in(TaskId::from_raw(id), &mut multipart).await?;
    let outcome = state.field_events.check_in(&actor, request).await?;
    Ok(Json(CheckInBody {
        task: TaskBody::from(&outcome.task),
        warnings: outcome.warnings,
    }))
}

async fn check_out<R, P, S, L, C>(
    State(state): State<AppState<R, P, S, L, C>>,
    CallerIdentity(actor): CallerIdentity,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<CheckOutBody>, ApiError>
where
    R: TaskRepository + 'static,
    P: PaymentRepository + 'static,
    S: AttachmentStore + 'static,
    L: ActivityLog + 'static,
    C: Clock + Send + Sync + 'static,
{
    let request = read_check_out(TaskId::from_raw(id), &mut multipart).await?;
    let outcome = state.field_events.check_out(&actor, request).await?;
    Ok(Json(CheckOutBody {
        task: TaskBody::from(&outcome.task),
        warnings: outcome.warnings,
        payment: outcome.payment.as_ref().map(PaymentBody::from),
    }))
}

async fn query_activity<R, P, S, L, C>(
    State(state): State<AppState<R, P, S, L, C>>,
    CallerIdentity(_actor): CallerIdentity,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<Activity>>, ApiError>
where
    R: TaskRepository + 'static,
    P: PaymentRepository + 'static,
    S: AttachmentStore + 'static,
    L: ActivityLog + 'static,
    C: Clock + Send + Sync + 'static,
{
    let topic = Topic::new(query.topic);
    let entries = state.log.query(&topic).await?;
    let result = match query.view {
        ActivityView::Raw => entries,
        ActivityView::Feed => {
            let options = if query.hide_unimportant {
                FeedOptions::hiding_unimportant()
            } else {
                FeedOptions::default()
            };
            project(&entries, &options)
        }
    };
    Ok(Json(result))
}
