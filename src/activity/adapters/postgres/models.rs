//! Diesel row models for activity persistence.

use super::schema::activities;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for activity records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityRow {
    /// Log-assigned identifier.
    pub id: i64,
    /// Aggregate partition key.
    pub topic: String,
    /// Tagged payload JSON.
    pub payload: Value,
    /// Acting user, if any.
    pub user_id: Option<uuid::Uuid>,
    /// Append timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for activity records; the id comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activities)]
pub struct NewActivityRow {
    /// Aggregate partition key.
    pub topic: String,
    /// Tagged payload JSON.
    pub payload: Value,
    /// Acting user, if any.
    pub user_id: Option<uuid::Uuid>,
    /// Append timestamp.
    pub created_at: DateTime<Utc>,
}
