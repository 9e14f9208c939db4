//! Value object trait: equality by value, not identity.
//!
//! Addresses, payment methods and order line items have no identity of their
//! own inside a user record; two with the same fields are interchangeable.

/// Marker trait for value objects.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Address { line1: Option<String>, city: Option<String> }
///
/// impl ValueObject for Address {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
