use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};

use tabsettle_core::{DomainError, ExpenseId, GroupId};
use tabsettle_settlement::{
    Expense, Group, Member, OutstandingPayments, Payment, SettlementRecord,
};

pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DirectoryError {
    /// No group is registered under this id.
    #[error("group {0} not found")]
    GroupNotFound(GroupId),

    /// The directory's registry lock was poisoned by a panicking writer.
    #[error("group directory lock poisoned")]
    Poisoned,

    /// A group operation failed; the domain error is passed through unchanged.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Registry of live groups, keyed by their deterministic id.
///
/// Implementors provide creation and lookup; the passthrough operations are
/// derived from [`GroupDirectory::lookup`].
pub trait GroupDirectory: Send + Sync {
    /// Create a group, or return the existing one with the same name and member set.
    fn create_group(&self, name: &str, members: Vec<Member>) -> DirectoryResult<Arc<Group>>;

    /// Optional lookup.
    fn get(&self, group_id: GroupId) -> DirectoryResult<Option<Arc<Group>>>;

    /// Number of registered groups.
    fn len(&self) -> DirectoryResult<usize>;

    fn is_empty(&self) -> DirectoryResult<bool> {
        Ok(self.len()? == 0)
    }

    fn contains(&self, group_id: GroupId) -> DirectoryResult<bool> {
        Ok(self.get(group_id)?.is_some())
    }

    /// Lookup that reports a missing group as [`DirectoryError::GroupNotFound`].
    fn lookup(&self, group_id: GroupId) -> DirectoryResult<Arc<Group>> {
        self.get(group_id)?
            .ok_or(DirectoryError::GroupNotFound(group_id))
    }

    #[instrument(skip(self, expense), fields(group_id = %group_id, expense_id = %expense.id_typed()))]
    fn add_or_replace_expense(&self, group_id: GroupId, expense: Expense) -> DirectoryResult<()> {
        self.lookup(group_id)?.add_or_replace_expense(expense)?;
        debug!("expense recorded");
        Ok(())
    }

    #[instrument(skip(self), fields(group_id = %group_id, expense_id = %expense_id))]
    fn remove_expense(&self, group_id: GroupId, expense_id: ExpenseId) -> DirectoryResult<bool> {
        let removed = self.lookup(group_id)?.remove_expense(expense_id)?;
        debug!(removed, "expense removal processed");
        Ok(removed)
    }

    #[instrument(
        skip(self, payment),
        fields(
            group_id = %group_id,
            payer = %payment.payer,
            receiver = %payment.receiver,
            amount = payment.amount
        )
    )]
    fn propose_settlement(
        &self,
        group_id: GroupId,
        payment: Payment,
    ) -> DirectoryResult<SettlementRecord> {
        let accepted = self.lookup(group_id)?.propose_settlement(payment)?;
        info!(record_id = %accepted.record.id_typed(), "settlement payment recorded");

        if accepted.latched {
            info!("group latched into settling; expenses are now frozen");
        }
        Ok(accepted.record)
    }

    fn outstanding_payments(&self, group_id: GroupId) -> DirectoryResult<Arc<OutstandingPayments>> {
        Ok(self.lookup(group_id)?.outstanding_payments())
    }

    fn expenses(&self, group_id: GroupId) -> DirectoryResult<Vec<Expense>> {
        Ok(self.lookup(group_id)?.expenses()?)
    }

    fn settlement_records(&self, group_id: GroupId) -> DirectoryResult<Vec<SettlementRecord>> {
        Ok(self.lookup(group_id)?.settlement_records()?)
    }
}

impl<D> GroupDirectory for Arc<D>
where
    D: GroupDirectory + ?Sized,
{
    fn create_group(&self, name: &str, members: Vec<Member>) -> DirectoryResult<Arc<Group>> {
        (**self).create_group(name, members)
    }

    fn get(&self, group_id: GroupId) -> DirectoryResult<Option<Arc<Group>>> {
        (**self).get(group_id)
    }

    fn len(&self) -> DirectoryResult<usize> {
        (**self).len()
    }
}
