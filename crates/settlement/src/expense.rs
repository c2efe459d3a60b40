use serde::{Deserialize, Serialize};

use tabsettle_core::{DomainError, DomainResult, Entity, ExpenseId, MemberId};

/// A single contribution to the group's shared costs.
///
/// Expenses are replaced wholesale: recording an expense whose id already
/// exists in the group overwrites the previous version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    id: ExpenseId,
    payer: MemberId,
    label: String,
    amount: f64,
}

impl Expense {
    pub fn new(payer: MemberId, label: impl Into<String>, amount: f64) -> Self {
        Self::with_id(ExpenseId::new(), payer, label, amount)
    }

    pub fn with_id(id: ExpenseId, payer: MemberId, label: impl Into<String>, amount: f64) -> Self {
        Self {
            id,
            payer,
            label: label.into(),
            amount,
        }
    }

    pub fn id_typed(&self) -> ExpenseId {
        self.id
    }

    pub fn payer(&self) -> MemberId {
        self.payer
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Checks the expense on its own, independent of any group.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.amount.is_finite() {
            return Err(DomainError::validation("expense amount must be a finite number"));
        }
        if self.amount < 0.0 {
            return Err(DomainError::validation("expense amount cannot be negative"));
        }
        if self.label.trim().is_empty() {
            return Err(DomainError::validation("expense label cannot be empty"));
        }
        Ok(())
    }
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
