//! Payment records and reconciliation against expected revenue.

use super::{AttachmentId, PaymentId, TaskDomainError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A payment collected against a task.
///
/// Created by a worker during check-out, or replaced by an admin correction.
/// Corrections always produce a `PAYMENT_UPDATED` activity referencing the
/// original; the activity log is the audit trail, never the row itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    task_id: TaskId,
    amount: Decimal,
    collected_by: UserId,
    collected_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice_attachment_id: Option<AttachmentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

/// Parameter object for reconstructing a persisted payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPaymentData {
    /// Persisted payment identifier.
    pub id: PaymentId,
    /// Task the payment belongs to.
    pub task_id: TaskId,
    /// Collected amount.
    pub amount: Decimal,
    /// Worker who collected the payment.
    pub collected_by: UserId,
    /// Collection timestamp.
    pub collected_at: DateTime<Utc>,
    /// Optional invoice attachment reference.
    pub invoice_attachment_id: Option<AttachmentId>,
    /// Optional free-text notes.
    pub notes: Option<String>,
}

impl Payment {
    /// Creates a new payment collected by a worker.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NonPositivePaymentAmount`] when the amount
    /// is zero or negative.
    pub fn new(
        task_id: TaskId,
        amount: Decimal,
        collected_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        if amount <= Decimal::ZERO {
            return Err(TaskDomainError::NonPositivePaymentAmount(amount));
        }
        Ok(Self {
            id: PaymentId::new(),
            task_id,
            amount,
            collected_by,
            collected_at: clock.utc(),
            invoice_attachment_id: None,
            notes: None,
        })
    }

    /// Reconstructs a payment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPaymentData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            amount: data.amount,
            collected_by: data.collected_by,
            collected_at: data.collected_at,
            invoice_attachment_id: data.invoice_attachment_id,
            notes: data.notes,
        }
    }

    /// Attaches free-text notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Links the stored invoice attachment.
    #[must_use]
    pub const fn with_invoice_attachment(mut self, attachment_id: AttachmentId) -> Self {
        self.invoice_attachment_id = Some(attachment_id);
        self
    }

    /// Returns a corrected copy of this payment with a new amount.
    ///
    /// The identifier, collector, and collection timestamp are retained so
    /// that the correction activity can reference the original record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NonPositivePaymentAmount`] when the
    /// corrected amount is zero or negative.
    pub fn corrected(&self, amount: Decimal) -> Result<Self, TaskDomainError> {
        if amount <= Decimal::ZERO {
            return Err(TaskDomainError::NonPositivePaymentAmount(amount));
        }
        let mut corrected = self.clone();
        corrected.amount = amount;
        Ok(corrected)
    }

    /// Returns the payment identifier.
    #[must_use]
    pub const fn id(&self) -> PaymentId {
        self.id
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the collected amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the collecting worker.
    #[must_use]
    pub const fn collected_by(&self) -> UserId {
        self.collected_by
    }

    /// Returns the collection timestamp.
    #[must_use]
    pub const fn collected_at(&self) -> DateTime<Utc> {
        self.collected_at
    }

    /// Returns the invoice attachment reference, if any.
    #[must_use]
    pub const fn invoice_attachment_id(&self) -> Option<AttachmentId> {
        self.invoice_attachment_id
    }

    /// Returns the notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Outcome of comparing a collected amount against expected revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    mismatch: bool,
    difference_abs: Decimal,
}

impl Reconciliation {
    /// Returns `true` when the collected amount deviates from the expected
    /// revenue by more than the tolerated share.
    #[must_use]
    pub const fn mismatch(&self) -> bool {
        self.mismatch
    }

    /// Absolute difference between collected and expected amounts; zero when
    /// no expected revenue is set.
    #[must_use]
    pub const fn difference_abs(&self) -> Decimal {
        self.difference_abs
    }
}

/// Compares a collected amount against an optional expected revenue figure.
///
/// A mismatch is flagged when expected revenue is set and the absolute
/// deviation exceeds 10% of it. Decimal arithmetic keeps the boundary exact:
/// a deviation of exactly 10% is not a mismatch. Without an expected figure
/// the amount is accepted as-is. Mismatches are advisory only and never block
/// check-out or payment persistence.
#[must_use]
pub fn reconcile(expected_revenue: Option<Decimal>, collected: Decimal) -> Reconciliation {
    expected_revenue.map_or(
        Reconciliation {
            mismatch: false,
            difference_abs: Decimal::ZERO,
        },
        |expected| {
            let difference_abs = (collected - expected).abs();
            Reconciliation {
                // difference / expected > 1/10, rearranged to stay exact.
                mismatch: difference_abs * Decimal::TEN > expected,
                difference_abs,
            }
        },
    )
}

/// Human-readable advisory for a flagged mismatch.
#[must_use]
pub fn mismatch_warning(expected: Decimal, collected: Decimal) -> String {
    format!("collected amount {collected} differs from expected revenue {expected} by more than 10%")
}
