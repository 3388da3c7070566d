//! In-memory attachment store standing in for the object-storage
//! collaborator.
//!
//! Holds metadata only (the bytes are dropped after size accounting), which
//! is all the core ever reads back. Supports soft deletion so that
//! dangling-reference behaviour can be exercised in tests.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Attachment, AttachmentId},
    ports::{
        AttachmentStore, AttachmentStoreError, AttachmentStoreResult, AttachmentUpload,
        StoredAttachment,
    },
};

/// Thread-safe in-memory implementation of [`AttachmentStore`].
#[derive(Clone)]
pub struct InMemoryAttachmentStore {
    state: Arc<RwLock<HashMap<AttachmentId, StoredEntry>>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

#[derive(Debug, Clone)]
struct StoredEntry {
    attachment: Attachment,
    deleted: bool,
}

impl InMemoryAttachmentStore {
    /// Creates an empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Creates an empty store with an injected clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            state: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }
}

impl Default for InMemoryAttachmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryAttachmentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryAttachmentStore").finish_non_exhaustive()
    }
}

fn lock_error(err: impl std::fmt::Display) -> AttachmentStoreError {
    AttachmentStoreError::infrastructure(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AttachmentStore for InMemoryAttachmentStore {
    async fn store(&self, upload: AttachmentUpload) -> AttachmentStoreResult<StoredAttachment> {
        let id = AttachmentId::new();
        let url = format!("memory://attachments/{id}");
        let attachment = Attachment {
            id,
            mime_type: upload.mime_type,
            size: upload.bytes.len() as u64,
            original_filename: upload.original_filename,
            uploaded_by: upload.uploaded_by,
            created_at: self.clock.utc(),
            url: url.clone(),
        };

        let mut state = self.state.write().map_err(lock_error)?;
        state.insert(
            id,
            StoredEntry {
                attachment,
                deleted: false,
            },
        );
        Ok(StoredAttachment { id, url })
    }

    async fn resolve(&self, ids: &[AttachmentId]) -> AttachmentStoreResult<Vec<Attachment>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.get(id))
            .filter(|entry| !entry.deleted)
            .map(|entry| entry.attachment.clone())
            .collect())
    }

    async fn delete(&self, id: AttachmentId) -> AttachmentStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let entry = state
            .get_mut(&id)
            .ok_or(AttachmentStoreError::NotFound(id))?;
        entry.deleted = true;
        Ok(())
    }
}
