//! Shared-expense settlement module.
//!
//! Pure domain logic only: no IO, no logging, no persistence concerns. A
//! [`Group`] owns its members, expenses and settlement log, and keeps the
//! minimal set of outstanding payments up to date after every mutation.

pub mod balance;
pub mod expense;
pub mod group;
pub mod member;
pub mod payment;

pub use balance::{BalanceSheet, OutstandingPayments, Position, SETTLED_TOLERANCE};
pub use expense::Expense;
pub use group::{
    AcceptedSettlement, AddOrReplaceExpense, ExpenseRecorded, ExpenseRemoved, Group, GroupCommand, GroupEvent,
    GroupLedger, GroupSnapshot, ProposeSettlement, RemoveExpense, SettlementRecorded,
};
pub use member::Member;
pub use payment::{Payment, SettlementRecord};
