//! Domain events: facts emitted by an aggregate's decision logic.

use chrono::{DateTime, Utc};

/// An immutable fact about one aggregate.
///
/// Events are produced by [`crate::Aggregate::handle`] and consumed by
/// [`crate::Aggregate::apply`]; the stable `event_type` lets logs and
/// serialized histories name them without depending on Rust type names.
pub trait DomainEvent: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Identifier type of the aggregate the event belongs to.
    type AggregateId: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// The aggregate this event was emitted by.
    fn aggregate_id(&self) -> &Self::AggregateId;

    /// Stable event name (e.g. "settlement.group.expense_recorded").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
