//! Port contracts for the task module.

mod payments;
mod repository;
mod storage;

pub use payments::{PaymentRepository, PaymentRepositoryError, PaymentRepositoryResult};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use storage::{
    AttachmentStore, AttachmentStoreError, AttachmentStoreResult, AttachmentUpload,
    StoredAttachment,
};
