//! Immutable activity records and their tagged payloads.

use crate::task::domain::{AttachmentId, AttachmentRef, PaymentId, TaskId, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Log-assigned, time-ordered activity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(i64);

impl ActivityId {
    /// Wraps a raw log-assigned identifier.
    #[must_use]
    pub const fn from_raw(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Partition key grouping all activities of one aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Creates a topic from a raw string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the canonical topic for a task aggregate.
    #[must_use]
    pub fn for_task(task_id: TaskId) -> Self {
        Self(format!("TASK_{task_id}"))
    }

    /// Returns the topic as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of activity kinds.
///
/// Payload shapes are tied to the action through [`ActivityPayload`]; this
/// enum exists for filtering and display grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    /// A task was created.
    TaskCreated,
    /// A task moved along a lifecycle edge.
    TaskStatusUpdated,
    /// The assignee set was replaced.
    TaskAssigneesUpdated,
    /// A worker checked in.
    TaskCheckedIn,
    /// A worker checked out.
    TaskCheckedOut,
    /// A payment was collected at check-out.
    PaymentCollected,
    /// An admin corrected a payment.
    PaymentUpdated,
    /// The expected revenue target changed.
    TaskExpectedRevenueUpdated,
    /// An attachment was soft-deleted.
    AttachmentDeleted,
    /// Attachments were uploaded outside of check-in/out.
    TaskAttachmentsUploaded,
}

impl ActivityAction {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "TASK_CREATED",
            Self::TaskStatusUpdated => "TASK_STATUS_UPDATED",
            Self::TaskAssigneesUpdated => "TASK_ASSIGNEES_UPDATED",
            Self::TaskCheckedIn => "TASK_CHECKED_IN",
            Self::TaskCheckedOut => "TASK_CHECKED_OUT",
            Self::PaymentCollected => "PAYMENT_COLLECTED",
            Self::PaymentUpdated => "PAYMENT_UPDATED",
            Self::TaskExpectedRevenueUpdated => "TASK_EXPECTED_REVENUE_UPDATED",
            Self::AttachmentDeleted => "ATTACHMENT_DELETED",
            Self::TaskAttachmentsUploaded => "TASK_ATTACHMENTS_UPLOADED",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured activity payload, tagged by action.
///
/// One variant per action kind keeps payload shapes strongly typed; an
/// unknown action cannot be constructed and is rejected at the
/// deserialization boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ActivityPayload {
    /// A task was created.
    TaskCreated {
        /// Name of the created task.
        name: String,
    },
    /// A task moved along a lifecycle edge.
    TaskStatusUpdated {
        /// Status before the transition.
        old_status: TaskStatus,
        /// Status after the transition.
        new_status: TaskStatus,
    },
    /// The assignee set was replaced.
    TaskAssigneesUpdated {
        /// The new assignee set.
        assignee_ids: Vec<UserId>,
    },
    /// A worker checked in.
    TaskCheckedIn {
        /// Distance from the task's reference point in meters; absent when
        /// the task has no location set.
        #[serde(skip_serializing_if = "Option::is_none")]
        distance_from_task: Option<f64>,
        /// Worker-supplied notes.
        #[serde(skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
        /// Advisory warnings, persisted verbatim.
        warnings: Vec<String>,
        /// Evidence attachments stored during the check-in.
        attachments: Vec<AttachmentRef>,
    },
    /// A worker checked out.
    TaskCheckedOut {
        /// Distance from the task's reference point in meters; absent when
        /// the task has no location set.
        #[serde(skip_serializing_if = "Option::is_none")]
        distance_from_task: Option<f64>,
        /// Worker-supplied notes.
        #[serde(skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
        /// Advisory warnings, persisted verbatim.
        warnings: Vec<String>,
        /// Evidence attachments stored during the check-out.
        attachments: Vec<AttachmentRef>,
    },
    /// A payment was collected at check-out.
    PaymentCollected {
        /// Identifier of the created payment record.
        payment_id: PaymentId,
        /// Collected amount.
        amount: Decimal,
        /// Whether reconciliation flagged a mismatch.
        mismatch: bool,
    },
    /// An admin corrected a payment; the original is referenced, never
    /// edited in place.
    PaymentUpdated {
        /// Identifier of the corrected payment record.
        payment_id: PaymentId,
        /// Amount before the correction.
        previous_amount: Decimal,
        /// Amount after the correction.
        amount: Decimal,
    },
    /// The expected revenue target changed.
    TaskExpectedRevenueUpdated {
        /// Previous target, if one was set.
        #[serde(skip_serializing_if = "Option::is_none")]
        previous: Option<Decimal>,
        /// New target.
        expected_revenue: Decimal,
    },
    /// An attachment was soft-deleted.
    AttachmentDeleted {
        /// The deleted attachment.
        attachment_id: AttachmentId,
    },
    /// Attachments were uploaded outside of check-in/out.
    TaskAttachmentsUploaded {
        /// The stored attachments.
        attachments: Vec<AttachmentRef>,
    },
}

impl ActivityPayload {
    /// Returns the action kind this payload belongs to.
    #[must_use]
    pub const fn action(&self) -> ActivityAction {
        match self {
            Self::TaskCreated { .. } => ActivityAction::TaskCreated,
            Self::TaskStatusUpdated { .. } => ActivityAction::TaskStatusUpdated,
            Self::TaskAssigneesUpdated { .. } => ActivityAction::TaskAssigneesUpdated,
            Self::TaskCheckedIn { .. } => ActivityAction::TaskCheckedIn,
            Self::TaskCheckedOut { .. } => ActivityAction::TaskCheckedOut,
            Self::PaymentCollected { .. } => ActivityAction::PaymentCollected,
            Self::PaymentUpdated { .. } => ActivityAction::PaymentUpdated,
            Self::TaskExpectedRevenueUpdated { .. } => ActivityAction::TaskExpectedRevenueUpdated,
            Self::AttachmentDeleted { .. } => ActivityAction::AttachmentDeleted,
            Self::TaskAttachmentsUploaded { .. } => ActivityAction::TaskAttachmentsUploaded,
        }
    }
}

/// An immutable audit-log record.
///
/// Never mutated or deleted once written; corrections are represented as new
/// records referencing the original through their payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    id: ActivityId,
    topic: Topic,
    #[serde(flatten)]
    payload: ActivityPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted activity record.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedActivityData {
    /// Log-assigned identifier.
    pub id: ActivityId,
    /// Aggregate partition key.
    pub topic: Topic,
    /// Structured payload.
    pub payload: ActivityPayload,
    /// Acting user; `None` for system-generated records.
    pub user_id: Option<UserId>,
    /// Append timestamp.
    pub created_at: DateTime<Utc>,
}

impl Activity {
    /// Reconstructs an activity from persisted storage.
    ///
    /// Log adapters are the only writers; everything else sees activities
    /// read-only.
    #[must_use]
    pub fn from_persisted(data: PersistedActivityData) -> Self {
        Self {
            id: data.id,
            topic: data.topic,
            payload: data.payload,
            user_id: data.user_id,
            created_at: data.created_at,
        }
    }

    /// Returns the log-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> ActivityId {
        self.id
    }

    /// Returns the aggregate partition key.
    #[must_use]
    pub const fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Returns the action kind.
    #[must_use]
    pub const fn action(&self) -> ActivityAction {
        self.payload.action()
    }

    /// Returns the structured payload.
    #[must_use]
    pub const fn payload(&self) -> &ActivityPayload {
        &self.payload
    }

    /// Returns the acting user, `None` for system-generated records.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Returns the append timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
