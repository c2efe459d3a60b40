//! Domain error model.

use thiserror::Error;

use crate::id::MemberId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a deterministic business-rule failure. None of them is
/// transient, so retrying the same call against the same state cannot succeed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// The group latched into settling; its expenses are frozen for good.
    #[error("group is settling: expenses can no longer be added or removed")]
    GroupSettling,

    /// The proposed payer owes nothing in the current outstanding set.
    #[error("no pending payments for payer {payer}")]
    NoPendingPaymentsForPayer { payer: MemberId },

    /// The payer has pending payments but none equals the proposed one.
    #[error("payment {payer} -> {receiver} of {amount} is not a pending settlement payment")]
    PaymentNotRecognized {
        payer: MemberId,
        receiver: MemberId,
        amount: f64,
    },

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A writer panicked while holding the group state lock.
    #[error("group state lock poisoned")]
    StatePoisoned,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Whether the failure is the permanent expense-edit latch.
    pub fn is_settling(&self) -> bool {
        matches!(self, Self::GroupSettling)
    }
}
