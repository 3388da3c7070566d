//! Task aggregate root and lifecycle status.

use super::{
    Actor, ParseTaskStatusError, Role, RoleGate, StatusChange, TaskDomainError, TaskId,
    TaskLocation, TransitionTrigger, UserId, rule_for,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Task lifecycle status.
///
/// Monotonic: valid operations only ever move a task forwards along
/// `Preparing → Ready → InProgress → Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created by an admin; not yet visible to field workers.
    Preparing,
    /// Released for field work; waiting for a worker check-in.
    Ready,
    /// A worker has checked in and is on site.
    InProgress,
    /// A worker has checked out. Terminal.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Returns `true` when no further status-changing operation is legal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Validated input for creating a task; the repository assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    name: String,
    location: Option<TaskLocation>,
    expected_revenue: Option<Decimal>,
    assignee_ids: BTreeSet<UserId>,
    created_at: DateTime<Utc>,
}

impl TaskDraft {
    /// Creates a draft with a validated name and a creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskName`] when the name is empty
    /// after trimming.
    pub fn new(name: impl Into<String>, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TaskDomainError::EmptyTaskName);
        }
        Ok(Self {
            name,
            location: None,
            expected_revenue: None,
            assignee_ids: BTreeSet::new(),
            created_at: clock.utc(),
        })
    }

    /// Sets the reference location used for check-in/out verification.
    #[must_use]
    pub fn with_location(mut self, location: TaskLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets the expected revenue target.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NegativeExpectedRevenue`] for negative
    /// amounts.
    pub fn with_expected_revenue(mut self, amount: Decimal) -> Result<Self, TaskDomainError> {
        if amount < Decimal::ZERO {
            return Err(TaskDomainError::NegativeExpectedRevenue(amount));
        }
        self.expected_revenue = Some(amount);
        Ok(self)
    }

    /// Sets the initial assignee set.
    #[must_use]
    pub fn with_assignees(mut self, assignee_ids: impl IntoIterator<Item = UserId>) -> Self {
        self.assignee_ids = assignee_ids.into_iter().collect();
        self
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the reference location, if set.
    #[must_use]
    pub const fn location(&self) -> Option<&TaskLocation> {
        self.location.as_ref()
    }

    /// Returns the expected revenue, if set.
    #[must_use]
    pub const fn expected_revenue(&self) -> Option<Decimal> {
        self.expected_revenue
    }

    /// Returns the initial assignee set.
    #[must_use]
    pub const fn assignee_ids(&self) -> &BTreeSet<UserId> {
        &self.assignee_ids
    }

    /// Returns the draft creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: String,
    status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<TaskLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_revenue: Option<Decimal>,
    assignee_ids: BTreeSet<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted task name.
    pub name: String,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted reference location, if any.
    pub location: Option<TaskLocation>,
    /// Persisted expected revenue, if any.
    pub expected_revenue: Option<Decimal>,
    /// Persisted assignee set.
    pub assignee_ids: BTreeSet<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Materializes a draft with its repository-assigned identifier.
    ///
    /// New tasks always start in [`TaskStatus::Preparing`].
    #[must_use]
    pub fn from_draft(id: TaskId, draft: TaskDraft) -> Self {
        Self {
            id,
            name: draft.name,
            status: TaskStatus::Preparing,
            location: draft.location,
            expected_revenue: draft.expected_revenue,
            assignee_ids: draft.assignee_ids,
            created_at: draft.created_at,
            updated_at: draft.created_at,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            status: data.status,
            location: data.location,
            expected_revenue: data.expected_revenue,
            assignee_ids: data.assignee_ids,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the reference location, if set.
    #[must_use]
    pub const fn location(&self) -> Option<&TaskLocation> {
        self.location.as_ref()
    }

    /// Returns the expected revenue, if set.
    #[must_use]
    pub const fn expected_revenue(&self) -> Option<Decimal> {
        self.expected_revenue
    }

    /// Returns the assignee set.
    #[must_use]
    pub const fn assignee_ids(&self) -> &BTreeSet<UserId> {
        &self.assignee_ids
    }

    /// Returns `true` when the user is in the assignee set.
    #[must_use]
    pub fn is_assigned(&self, user_id: UserId) -> bool {
        self.assignee_ids.contains(&user_id)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Checks whether the actor may move this task to `target` through the
    /// given trigger, without mutating anything.
    ///
    /// The actual status write happens in the repository as a conditional
    /// update; this check decides the error class up front.
    ///
    /// # Errors
    ///
    /// - [`TaskDomainError::InvalidTransition`] when `(status, target)` is
    ///   not a legal edge or is not reachable through `trigger`.
    /// - [`TaskDomainError::AdminRequired`] when a non-admin requests an
    ///   admin-only edge.
    /// - [`TaskDomainError::NotAssigned`] when a worker outside the assignee
    ///   set (or an admin) requests a worker-only edge.
    pub fn authorize_transition(
        &self,
        actor: &Actor,
        target: TaskStatus,
        trigger: TransitionTrigger,
    ) -> Result<StatusChange, TaskDomainError> {
        let invalid = TaskDomainError::InvalidTransition {
            task_id: self.id,
            from: self.status,
            to: target,
        };
        let Some(rule) = rule_for(self.status, target) else {
            return Err(invalid);
        };
        if rule.trigger != trigger {
            return Err(invalid);
        }
        match rule.gate {
            RoleGate::AdminOnly => {
                if !actor.is_admin() {
                    return Err(TaskDomainError::AdminRequired {
                        user_id: actor.user_id(),
                    });
                }
            }
            RoleGate::AssignedWorker => {
                if actor.role() != Role::Worker || !self.is_assigned(actor.user_id()) {
                    return Err(TaskDomainError::NotAssigned {
                        task_id: self.id,
                        user_id: actor.user_id(),
                    });
                }
            }
        }
        Ok(StatusChange {
            from: self.status,
            to: target,
        })
    }

    /// Replaces the assignee set.
    pub fn set_assignees(
        &mut self,
        assignee_ids: impl IntoIterator<Item = UserId>,
        clock: &impl Clock,
    ) {
        self.assignee_ids = assignee_ids.into_iter().collect();
        self.touch(clock);
    }

    /// Sets or replaces the expected revenue target.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NegativeExpectedRevenue`] for negative
    /// amounts.
    pub fn set_expected_revenue(
        &mut self,
        amount: Decimal,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if amount < Decimal::ZERO {
            return Err(TaskDomainError::NegativeExpectedRevenue(amount));
        }
        self.expected_revenue = Some(amount);
        self.touch(clock);
        Ok(())
    }

    /// Applies an already-persisted status change to this in-memory copy.
    ///
    /// Used by repository adapters after a successful conditional update.
    pub fn apply_status(&mut self, status: TaskStatus, updated_at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = updated_at;
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
