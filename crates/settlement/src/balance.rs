//! Balance computation and minimal settlement matching.
//!
//! Everything here is a pure function of the group's members, expenses and
//! already recorded settlements. Given the same inputs it produces the same
//! payments in the same order.
//!
//! Roles follow the group's vocabulary:
//! - a **debtor** paid less than the share and still has to pay money out;
//! - an **overpayer** (a "borrower" of the group's money) paid at least the
//!   share and receives money. Settlement payments always flow from a debtor
//!   to an overpayer.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tabsettle_core::MemberId;

use crate::expense::Expense;
use crate::member::Member;
use crate::payment::{Payment, SettlementRecord};

/// Remainders at or below this are considered settled (floating-point drift).
pub const SETTLED_TOLERANCE: f64 = 1e-4;

/// A member's outstanding magnitude: what a debtor owes, or an overpayer's credit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub member: MemberId,
    pub amount: f64,
}

/// Intermediate balance of a group before any payment is matched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub total: f64,
    pub share: f64,
    pub paid_by: BTreeMap<MemberId, f64>,
    /// Largest debt first; equal debts ordered by member id.
    pub debtors: Vec<Position>,
    /// Largest credit first; equal credits ordered by member id.
    pub overpayers: Vec<Position>,
}

impl BalanceSheet {
    pub fn compute<'a, I>(members: &[Member], expenses: I) -> Self
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let mut paid_by: BTreeMap<MemberId, f64> =
            members.iter().map(|m| (m.id_typed(), 0.0)).collect();

        let mut total = 0.0;
        for expense in expenses {
            total += expense.amount();
            if let Some(paid) = paid_by.get_mut(&expense.payer()) {
                *paid += expense.amount();
            }
        }

        let share = if members.is_empty() {
            0.0
        } else {
            total / members.len() as f64
        };

        let mut debtors = Vec::new();
        let mut overpayers = Vec::new();
        for (&member, &paid) in &paid_by {
            if paid < share {
                debtors.push(Position {
                    member,
                    amount: share - paid,
                });
            } else {
                overpayers.push(Position {
                    member,
                    amount: paid - share,
                });
            }
        }
        debtors.sort_by(largest_first);
        overpayers.sort_by(largest_first);

        Self {
            total,
            share,
            paid_by,
            debtors,
            overpayers,
        }
    }

    /// Greedy descending match of debtors against overpayers.
    ///
    /// Each payment drains either its debtor or its overpayer, so at most
    /// `debtors + overpayers - 1` payments are produced.
    pub fn match_payments(&self) -> Vec<Payment> {
        let mut owed: Vec<Position> = self.debtors.clone();
        let mut payments = Vec::new();
        let mut next = 0;

        for overpayer in &self.overpayers {
            let mut credit = overpayer.amount;

            while credit > SETTLED_TOLERANCE && next < owed.len() {
                let debtor = &mut owed[next];
                if debtor.amount <= SETTLED_TOLERANCE {
                    next += 1;
                    continue;
                }

                let transfer = credit.min(debtor.amount);
                payments.push(Payment::new(debtor.member, overpayer.member, transfer));
                credit -= transfer;
                debtor.amount -= transfer;
            }
        }

        payments
    }
}

fn largest_first(a: &Position, b: &Position) -> Ordering {
    b.amount
        .total_cmp(&a.amount)
        .then_with(|| a.member.cmp(&b.member))
}

/// Outstanding settlement payments grouped by payer.
///
/// Payments of one payer keep the order in which they were matched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutstandingPayments(BTreeMap<MemberId, Vec<Payment>>);

impl OutstandingPayments {
    pub fn from_payments(payments: impl IntoIterator<Item = Payment>) -> Self {
        let mut by_payer: BTreeMap<MemberId, Vec<Payment>> = BTreeMap::new();
        for payment in payments {
            by_payer.entry(payment.payer).or_default().push(payment);
        }
        Self(by_payer)
    }

    pub fn for_payer(&self, payer: &MemberId) -> Option<&[Payment]> {
        self.0.get(payer).map(Vec::as_slice)
    }

    pub fn contains(&self, payment: &Payment) -> bool {
        self.for_payer(&payment.payer)
            .is_some_and(|pending| pending.contains(payment))
    }

    pub fn payers(&self) -> impl Iterator<Item = &MemberId> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, &[Payment])> {
        self.0.iter().map(|(payer, payments)| (payer, payments.as_slice()))
    }

    pub fn payments(&self) -> impl Iterator<Item = &Payment> {
        self.0.values().flatten()
    }

    /// Number of payers with at least one pending payment.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_for_payer(&self, payer: &MemberId) -> f64 {
        self.for_payer(payer)
            .map(|pending| pending.iter().map(|p| p.amount).sum())
            .unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.payments().map(|p| p.amount).sum()
    }
}

/// Recompute the outstanding payments of a group from scratch.
///
/// Payments that equal an already recorded settlement are not proposed again.
pub fn recompute<'a, I>(
    members: &[Member],
    expenses: I,
    records: &[SettlementRecord],
) -> OutstandingPayments
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut payments = BalanceSheet::compute(members, expenses).match_payments();
    payments.retain(|payment| !records.iter().any(|r| r.payment() == payment));
    OutstandingPayments::from_payments(payments)
}
