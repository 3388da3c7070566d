//! In-memory payment repository for unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Payment, TaskId},
    ports::{PaymentRepository, PaymentRepositoryError, PaymentRepositoryResult},
};

/// Thread-safe in-memory payment repository, one current payment per task.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<HashMap<TaskId, Payment>>>,
}

impl InMemoryPaymentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> PaymentRepositoryError {
    PaymentRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn store(&self, payment: &Payment) -> PaymentRepositoryResult<()> {
        let mut guard = self.payments.write().map_err(lock_error)?;
        if guard.contains_key(&payment.task_id()) {
            return Err(PaymentRepositoryError::DuplicatePayment(payment.task_id()));
        }
        guard.insert(payment.task_id(), payment.clone());
        Ok(())
    }

    async fn replace(&self, payment: &Payment) -> PaymentRepositoryResult<()> {
        let mut guard = self.payments.write().map_err(lock_error)?;
        if !guard.contains_key(&payment.task_id()) {
            return Err(PaymentRepositoryError::NotFound(payment.task_id()));
        }
        guard.insert(payment.task_id(), payment.clone());
        Ok(())
    }

    async fn find_by_task(&self, task_id: TaskId) -> PaymentRepositoryResult<Option<Payment>> {
        let guard = self.payments.read().map_err(lock_error)?;
        Ok(guard.get(&task_id).cloned())
    }
}
