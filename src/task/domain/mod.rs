//! Domain model for field-service task coordination.
//!
//! Models the task aggregate, its role-gated lifecycle, geodesic check-in
//! verification, and payment reconciliation while keeping all infrastructure
//! concerns outside of the domain boundary.

mod actor;
mod attachment;
mod error;
pub mod geo;
mod ids;
mod payment;
mod task;
mod transition;

pub use actor::{Actor, Role};
pub use attachment::{Attachment, AttachmentRef};
pub use error::{ParseRoleError, ParseTaskStatusError, TaskDomainError};
pub use geo::{GeoFix, GeoPoint, GeoVerification, TaskLocation};
pub use ids::{AttachmentId, PaymentId, TaskId, UserId};
pub use payment::{Payment, PersistedPaymentData, Reconciliation, mismatch_warning, reconcile};
pub use task::{PersistedTaskData, Task, TaskDraft, TaskStatus};
pub use transition::{RoleGate, StatusChange, TransitionRule, TransitionTrigger, rule_for};
