//! Port contract for the object-storage collaborator holding attachment
//! bytes.

use crate::task::domain::{Attachment, AttachmentId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for attachment store operations.
pub type AttachmentStoreResult<T> = Result<T, AttachmentStoreError>;

/// A file received from a client, ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// Original client-side filename.
    pub original_filename: String,
    /// Client-reported MIME type.
    pub mime_type: String,
    /// Uploading user.
    pub uploaded_by: UserId,
}

/// Reference returned by the collaborator after storing bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttachment {
    /// Storage-assigned identifier.
    pub id: AttachmentId,
    /// Collaborator-issued URL for the bytes.
    pub url: String,
}

/// Object-storage contract.
///
/// Deleted attachments vanish from `resolve` results silently — a dangling
/// reference from an activity payload or a payment is a display concern, not
/// a data-integrity error.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Stores file bytes, returning the assigned reference.
    async fn store(&self, upload: AttachmentUpload) -> AttachmentStoreResult<StoredAttachment>;

    /// Resolves metadata for the given ids; soft-deleted attachments are
    /// omitted from the result rather than reported as errors.
    async fn resolve(&self, ids: &[AttachmentId]) -> AttachmentStoreResult<Vec<Attachment>>;

    /// Soft-deletes an attachment; the bytes may linger, but the id stops
    /// resolving.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentStoreError::NotFound`] when the id was never
    /// stored.
    async fn delete(&self, id: AttachmentId) -> AttachmentStoreResult<()>;
}

/// Errors returned by attachment store implementations.
#[derive(Debug, Clone, Error)]
pub enum AttachmentStoreError {
    /// The attachment was never stored.
    #[error("attachment not found: {0}")]
    NotFound(AttachmentId),

    /// Storage-collaborator failure.
    #[error("attachment storage failure: {0}")]
    Infrastructure(Arc<dyn std::error::Error + Send + Sync>),
}

impl AttachmentStoreError {
    /// Wraps an infrastructure error.
    #[must_use]
    pub fn infrastructure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Infrastructure(Arc::new(err))
    }
}
