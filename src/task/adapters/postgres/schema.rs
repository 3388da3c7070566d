//! Diesel schema for task and payment persistence.

diesel::table! {
    /// Task records; `status` is a cached projection of the activity log.
    tasks (id) {
        /// Repository-assigned identifier (`BIGSERIAL`).
        id -> Int8,
        /// Task name.
        #[max_length = 255]
        name -> Varchar,
        /// Lifecycle status, advanced only by conditional update.
        #[max_length = 50]
        status -> Varchar,
        /// Optional reference location payload.
        location -> Nullable<Jsonb>,
        /// Optional expected revenue target.
        expected_revenue -> Nullable<Numeric>,
        /// Assigned worker identifiers.
        assignee_ids -> Array<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One current payment per task; corrections replace the row and the
    /// activity log keeps the history.
    payments (id) {
        /// Payment identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Int8,
        /// Collected amount.
        amount -> Numeric,
        /// Collecting worker.
        collected_by -> Uuid,
        /// Collection timestamp.
        collected_at -> Timestamptz,
        /// Optional invoice attachment reference.
        invoice_attachment_id -> Nullable<Uuid>,
        /// Optional free-text notes.
        notes -> Nullable<Text>,
    }
}
