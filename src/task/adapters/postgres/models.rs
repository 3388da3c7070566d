//! Diesel row models for task and payment persistence.

use super::schema::{payments, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Repository-assigned identifier.
    pub id: i64,
    /// Task name.
    pub name: String,
    /// Lifecycle status.
    pub status: String,
    /// Optional location JSON payload.
    pub location: Option<Value>,
    /// Optional expected revenue.
    pub expected_revenue: Option<Decimal>,
    /// Assigned worker identifiers.
    pub assignee_ids: Vec<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records; the id comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task name.
    pub name: String,
    /// Lifecycle status.
    pub status: String,
    /// Optional location JSON payload.
    pub location: Option<Value>,
    /// Optional expected revenue.
    pub expected_revenue: Option<Decimal>,
    /// Assigned worker identifiers.
    pub assignee_ids: Vec<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for payment records, used for both queries and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentRow {
    /// Payment identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: i64,
    /// Collected amount.
    pub amount: Decimal,
    /// Collecting worker.
    pub collected_by: uuid::Uuid,
    /// Collection timestamp.
    pub collected_at: DateTime<Utc>,
    /// Optional invoice attachment reference.
    pub invoice_attachment_id: Option<uuid::Uuid>,
    /// Optional free-text notes.
    pub notes: Option<String>,
}
