use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tabsettle_core::{DomainError, DomainResult, Entity, MemberId, RecordId, ValueObject};

/// A transfer of money from `payer` to `receiver`.
///
/// Used both for proposed settlement payments and for recorded ones. Two
/// payments are the same payment iff payer, receiver and amount are all equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payer: MemberId,
    pub receiver: MemberId,
    pub amount: f64,
}

impl ValueObject for Payment {}

impl Payment {
    pub fn new(payer: MemberId, receiver: MemberId, amount: f64) -> Self {
        Self {
            payer,
            receiver,
            amount,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(DomainError::validation(
                "payment amount must be a positive finite number",
            ));
        }
        if self.payer == self.receiver {
            return Err(DomainError::validation("payer and receiver must differ"));
        }
        Ok(())
    }
}

/// An accepted settlement payment. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    id: RecordId,
    payment: Payment,
    recorded_at: DateTime<Utc>,
}

impl SettlementRecord {
    pub fn new(id: RecordId, payment: Payment, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id,
            payment,
            recorded_at,
        }
    }

    pub fn id_typed(&self) -> RecordId {
        self.id
    }

    pub fn payment(&self) -> &Payment {
        &self.payment
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

impl Entity for SettlementRecord {
    type Id = RecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payments_compare_by_value() {
        let (a, b) = (MemberId::new(), MemberId::new());
        assert_eq!(Payment::new(a, b, 100.0), Payment::new(a, b, 100.0));
        assert_ne!(Payment::new(a, b, 100.0), Payment::new(a, b, 30.0));
        assert_ne!(Payment::new(a, b, 100.0), Payment::new(b, a, 100.0));
    }

    #[test]
    fn self_payment_is_rejected() {
        let a = MemberId::new();
        let err = Payment::new(a, a, 10.0).validate().unwrap_err();
        assert_eq!(err, DomainError::validation("payer and receiver must differ"));
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let (a, b) = (MemberId::new(), MemberId::new());
        for amount in [0.0, -5.0, f64::NAN] {
            assert!(Payment::new(a, b, amount).validate().is_err(), "amount {amount}");
        }
    }
}
