use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tabsettle_core::{
    Aggregate, AggregateRoot, DEFAULT_GROUP_ID_SALT, DomainError, DomainEvent, DomainResult,
    ExpenseId, GroupId, MemberId, RecordId,
};

use crate::balance::{self, OutstandingPayments};
use crate::expense::Expense;
use crate::member::Member;
use crate::payment::{Payment, SettlementRecord};

/// Command: AddOrReplaceExpense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOrReplaceExpense {
    pub expense: Expense,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveExpense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveExpense {
    pub expense_id: ExpenseId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ProposeSettlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposeSettlement {
    pub record_id: RecordId,
    pub payment: Payment,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupCommand {
    AddOrReplaceExpense(AddOrReplaceExpense),
    RemoveExpense(RemoveExpense),
    ProposeSettlement(ProposeSettlement),
}

/// Event: ExpenseRecorded (inserted or replaced).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecorded {
    pub group_id: GroupId,
    pub expense: Expense,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ExpenseRemoved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRemoved {
    pub group_id: GroupId,
    pub expense_id: ExpenseId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SettlementRecorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecorded {
    pub group_id: GroupId,
    pub record: SettlementRecord,
    /// Set when this record moved the group into settling.
    pub latched: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupEvent {
    ExpenseRecorded(ExpenseRecorded),
    ExpenseRemoved(ExpenseRemoved),
    SettlementRecorded(SettlementRecorded),
}

impl DomainEvent for GroupEvent {
    type AggregateId = GroupId;

    fn aggregate_id(&self) -> &Self::AggregateId {
        match self {
            GroupEvent::ExpenseRecorded(e) => &e.group_id,
            GroupEvent::ExpenseRemoved(e) => &e.group_id,
            GroupEvent::SettlementRecorded(e) => &e.group_id,
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            GroupEvent::ExpenseRecorded(_) => "settlement.group.expense_recorded",
            GroupEvent::ExpenseRemoved(_) => "settlement.group.expense_removed",
            GroupEvent::SettlementRecorded(_) => "settlement.group.settlement_recorded",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            GroupEvent::ExpenseRecorded(e) => e.occurred_at,
            GroupEvent::ExpenseRemoved(e) => e.occurred_at,
            GroupEvent::SettlementRecorded(e) => e.record.recorded_at(),
        }
    }
}

/// Mutable state of one group.
///
/// `outstanding` is always derived from `expenses` and `records`: every
/// applied event recomputes it before returning.
#[derive(Debug, Clone)]
pub struct GroupLedger {
    id: GroupId,
    members: Arc<[Member]>,
    expenses: BTreeMap<ExpenseId, Expense>,
    records: Vec<SettlementRecord>,
    settling: bool,
    outstanding: Arc<OutstandingPayments>,
    version: u64,
}

impl GroupLedger {
    pub fn new(id: GroupId, members: Arc<[Member]>) -> Self {
        Self {
            id,
            members,
            expenses: BTreeMap::new(),
            records: Vec::new(),
            settling: false,
            outstanding: Arc::new(OutstandingPayments::default()),
            version: 0,
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn expenses(&self) -> impl Iterator<Item = &Expense> {
        self.expenses.values()
    }

    pub fn records(&self) -> &[SettlementRecord] {
        &self.records
    }

    pub fn is_settling(&self) -> bool {
        self.settling
    }

    pub fn outstanding(&self) -> &Arc<OutstandingPayments> {
        &self.outstanding
    }

    fn ensure_open(&self) -> DomainResult<()> {
        if self.settling {
            return Err(DomainError::GroupSettling);
        }
        Ok(())
    }

    fn ensure_member(&self, member: MemberId) -> DomainResult<()> {
        if self.members.iter().any(|m| m.id_typed() == member) {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "member {member} does not belong to group {}",
                self.id
            )))
        }
    }

    fn recompute(&mut self) {
        self.outstanding = Arc::new(balance::recompute(
            &self.members,
            self.expenses.values(),
            &self.records,
        ));
    }

    fn handle_add(&self, cmd: &AddOrReplaceExpense) -> DomainResult<Vec<GroupEvent>> {
        self.ensure_open()?;
        cmd.expense.validate()?;
        self.ensure_member(cmd.expense.payer())?;

        Ok(vec![GroupEvent::ExpenseRecorded(ExpenseRecorded {
            group_id: self.id,
            expense: cmd.expense.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveExpense) -> DomainResult<Vec<GroupEvent>> {
        self.ensure_open()?;

        if !self.expenses.contains_key(&cmd.expense_id) {
            return Ok(vec![]);
        }

        Ok(vec![GroupEvent::ExpenseRemoved(ExpenseRemoved {
            group_id: self.id,
            expense_id: cmd.expense_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_settlement(&self, cmd: &ProposeSettlement) -> DomainResult<Vec<GroupEvent>> {
        let payment = cmd.payment;
        payment.validate()?;

        let pending = self
            .outstanding
            .for_payer(&payment.payer)
            .ok_or(DomainError::NoPendingPaymentsForPayer {
                payer: payment.payer,
            })?;

        if !pending.contains(&payment) {
            return Err(DomainError::PaymentNotRecognized {
                payer: payment.payer,
                receiver: payment.receiver,
                amount: payment.amount,
            });
        }

        Ok(vec![GroupEvent::SettlementRecorded(SettlementRecorded {
            group_id: self.id,
            record: SettlementRecord::new(cmd.record_id, payment, cmd.recorded_at),
            latched: !self.settling,
        })])
    }
}

impl AggregateRoot for GroupLedger {
    type Id = GroupId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for GroupLedger {
    type Command = GroupCommand;
    type Event = GroupEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            GroupEvent::ExpenseRecorded(e) => {
                self.expenses.insert(e.expense.id_typed(), e.expense.clone());
            }
            GroupEvent::ExpenseRemoved(e) => {
                self.expenses.remove(&e.expense_id);
            }
            GroupEvent::SettlementRecorded(e) => {
                self.records.push(e.record.clone());
                self.settling = true;
            }
        }

        self.recompute();
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            GroupCommand::AddOrReplaceExpense(cmd) => self.handle_add(cmd),
            GroupCommand::RemoveExpense(cmd) => self.handle_remove(cmd),
            GroupCommand::ProposeSettlement(cmd) => self.handle_settlement(cmd),
        }
    }
}

/// Immutable view published after every accepted mutation.
#[derive(Debug, Clone, Default)]
pub struct GroupSnapshot {
    pub version: u64,
    pub settling: bool,
    pub outstanding: Arc<OutstandingPayments>,
}

/// A settlement accepted by [`Group::propose_settlement`].
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedSettlement {
    pub record: SettlementRecord,
    /// True only for the settlement that latched the group.
    pub latched: bool,
}

/// Aggregate root: Group.
///
/// Mutations run `handle` + `apply` + publish under one lock on the
/// [`GroupLedger`]. Readers of [`Group::snapshot`] load the published `Arc`
/// atomically and never wait on a writer.
#[derive(Debug)]
pub struct Group {
    id: GroupId,
    name: String,
    members: Arc<[Member]>,
    ledger: Mutex<GroupLedger>,
    published: ArcSwap<GroupSnapshot>,
}

impl Group {
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> DomainResult<Self> {
        Self::with_id_salt(name, members, DEFAULT_GROUP_ID_SALT)
    }

    /// Like [`Group::new`], hashing the identity with a caller-chosen salt.
    pub fn with_id_salt(
        name: impl Into<String>,
        members: Vec<Member>,
        salt: &str,
    ) -> DomainResult<Self> {
        let name = name.into();
        let member_ids = Self::validate_members(&members)?;
        let id = GroupId::derive(&name, &member_ids, salt);
        let members: Arc<[Member]> = members.into();

        Ok(Self {
            id,
            name,
            members: Arc::clone(&members),
            ledger: Mutex::new(GroupLedger::new(id, members)),
            published: ArcSwap::from_pointee(GroupSnapshot::default()),
        })
    }

    fn validate_members(members: &[Member]) -> DomainResult<Vec<MemberId>> {
        if members.is_empty() {
            return Err(DomainError::validation("a group needs at least one member"));
        }

        let ids: Vec<MemberId> = members.iter().map(Member::id_typed).collect();
        let distinct: BTreeSet<&MemberId> = ids.iter().collect();
        if distinct.len() != ids.len() {
            return Err(DomainError::validation("group members must be distinct"));
        }
        Ok(ids)
    }

    pub fn id_typed(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn add_or_replace_expense(&self, expense: Expense) -> DomainResult<()> {
        self.execute(GroupCommand::AddOrReplaceExpense(AddOrReplaceExpense {
            expense,
            occurred_at: Utc::now(),
        }))?;
        Ok(())
    }

    /// Returns whether an expense was actually removed.
    pub fn remove_expense(&self, expense_id: ExpenseId) -> DomainResult<bool> {
        let events = self.execute(GroupCommand::RemoveExpense(RemoveExpense {
            expense_id,
            occurred_at: Utc::now(),
        }))?;
        Ok(!events.is_empty())
    }

    /// Accepts `payment` if it is one of the payer's pending settlement payments.
    ///
    /// The first accepted payment latches the group into settling.
    pub fn propose_settlement(&self, payment: Payment) -> DomainResult<AcceptedSettlement> {
        let events = self.execute(GroupCommand::ProposeSettlement(ProposeSettlement {
            record_id: RecordId::new(),
            payment,
            recorded_at: Utc::now(),
        }))?;

        events
            .into_iter()
            .find_map(|event| match event {
                GroupEvent::SettlementRecorded(e) => Some(AcceptedSettlement {
                    record: e.record,
                    latched: e.latched,
                }),
                _ => None,
            })
            .ok_or_else(|| DomainError::validation("settlement produced no record"))
    }

    /// Current outstanding payments, grouped by payer.
    pub fn outstanding_payments(&self) -> Arc<OutstandingPayments> {
        Arc::clone(&self.snapshot().outstanding)
    }

    pub fn snapshot(&self) -> Arc<GroupSnapshot> {
        self.published.load_full()
    }

    pub fn is_settling(&self) -> bool {
        self.snapshot().settling
    }

    pub fn expenses(&self) -> DomainResult<Vec<Expense>> {
        let ledger = self.ledger.lock().map_err(|_| DomainError::StatePoisoned)?;
        Ok(ledger.expenses().cloned().collect())
    }

    pub fn settlement_records(&self) -> DomainResult<Vec<SettlementRecord>> {
        let ledger = self.ledger.lock().map_err(|_| DomainError::StatePoisoned)?;
        Ok(ledger.records().to_vec())
    }

    fn execute(&self, command: GroupCommand) -> DomainResult<Vec<GroupEvent>> {
        let mut ledger = self.ledger.lock().map_err(|_| DomainError::StatePoisoned)?;
        let events = ledger.execute(&command)?;

        // Publish while still holding the ledger so snapshots appear in mutation order.
        if !events.is_empty() {
            self.publish(GroupSnapshot {
                version: ledger.version(),
                settling: ledger.is_settling(),
                outstanding: Arc::clone(ledger.outstanding()),
            });
        }
        Ok(events)
    }

    fn publish(&self, snapshot: GroupSnapshot) {
        self.published.store(Arc::new(snapshot));
    }
}

impl AggregateRoot for Group {
    type Id = GroupId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.snapshot().version
    }
}
