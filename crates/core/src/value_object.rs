//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: they are defined entirely by their
/// attribute values, so two instances with equal fields are the same value.
/// They are immutable; to "change" one, build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Transfer {
///     from: MemberId,
///     to: MemberId,
///     amount: f64,
/// }
///
/// impl ValueObject for Transfer {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
