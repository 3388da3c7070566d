//! Role- and trigger-gated lifecycle transition table.
//!
//! The table is an exhaustive match over `(from, to)` pairs, so an unhandled
//! status combination is a compile-time error rather than a silent no-op
//! behind a dynamic lookup.

use super::TaskStatus;

/// How a transition was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTrigger {
    /// Direct administrative action (e.g. marking a prepared task ready).
    AdminAction,
    /// Worker check-in carrying a location fix.
    CheckIn,
    /// Worker check-out carrying a location fix.
    CheckOut,
}

/// Who may take a given lifecycle edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGate {
    /// Admins only; workers are rejected even when assigned.
    AdminOnly,
    /// Workers present in the task's assignee set; admins may not take the
    /// edge directly because it is evidence-gated.
    AssignedWorker,
}

/// Gate describing a single legal lifecycle edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    /// Role restriction for the edge.
    pub gate: RoleGate,
    /// The only trigger through which the edge is reachable.
    pub trigger: TransitionTrigger,
}

/// Looks up the rule for a `(from, to)` edge.
///
/// Returns `None` for every pair that is not a legal lifecycle edge,
/// including self-transitions, skips, and anything out of the terminal
/// `Completed` status.
#[must_use]
pub const fn rule_for(from: TaskStatus, to: TaskStatus) -> Option<TransitionRule> {
    match (from, to) {
        (TaskStatus::Preparing, TaskStatus::Ready) => Some(TransitionRule {
            gate: RoleGate::AdminOnly,
            trigger: TransitionTrigger::AdminAction,
        }),
        (TaskStatus::Ready, TaskStatus::InProgress) => Some(TransitionRule {
            gate: RoleGate::AssignedWorker,
            trigger: TransitionTrigger::CheckIn,
        }),
        (TaskStatus::InProgress, TaskStatus::Completed) => Some(TransitionRule {
            gate: RoleGate::AssignedWorker,
            trigger: TransitionTrigger::CheckOut,
        }),
        (
            TaskStatus::Preparing | TaskStatus::Ready | TaskStatus::InProgress
            | TaskStatus::Completed,
            _,
        ) => None,
    }
}

/// An accepted status change, carried into the activity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// Status before the transition.
    pub from: TaskStatus,
    /// Status after the transition.
    pub to: TaskStatus,
}
