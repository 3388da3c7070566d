//! Attachment metadata references.
//!
//! Attachment bytes live in the object-storage collaborator; the core only
//! holds identifiers and metadata. References may dangle after a soft
//! delete, which readers must tolerate.

use super::{AttachmentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a stored attachment, as resolved from the storage
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Storage-assigned identifier.
    pub id: AttachmentId,
    /// MIME type reported at upload time.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Original client-side filename.
    pub original_filename: String,
    /// Uploading user.
    pub uploaded_by: UserId,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
    /// Collaborator-issued URL for the bytes.
    pub url: String,
}

/// Lightweight reference embedded in activity payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Referenced attachment identifier.
    pub id: AttachmentId,
}

impl From<AttachmentId> for AttachmentRef {
    fn from(id: AttachmentId) -> Self {
        Self { id }
    }
}
