//! In-memory adapters for unit testing without a database.

mod payment;
mod storage;
mod task;

pub use payment::InMemoryPaymentRepository;
pub use storage::InMemoryAttachmentStore;
pub use task::InMemoryTaskRepository;
