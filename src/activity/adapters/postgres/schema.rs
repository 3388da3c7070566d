//! Diesel schema for activity log persistence.

diesel::table! {
    /// Append-only activity records; rows are never updated or deleted.
    activities (id) {
        /// Log-assigned, time-ordered identifier (`BIGSERIAL`).
        id -> Int8,
        /// Aggregate partition key (e.g. `TASK_42`).
        #[max_length = 255]
        topic -> Varchar,
        /// Structured payload including the action tag.
        payload -> Jsonb,
        /// Acting user; null for system-generated records.
        user_id -> Nullable<Uuid>,
        /// Append timestamp.
        created_at -> Timestamptz,
    }
}
