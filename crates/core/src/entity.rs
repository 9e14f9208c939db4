//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Users and catalog products are entities: two instances with the same id
/// describe the same thing even when their other fields differ.
pub trait Entity {
    /// Identifier type. Remote ids are opaque strings in this layer.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Whether both values refer to the same entity.
    fn same_identity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
