//! Entity trait: identity + continuity across edits.

/// Entity marker + minimal interface.
///
/// Portal records are entities: a full-record update keeps the id and replaces
/// everything else.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// Overwrite the identifier (used when a collection assigns or preserves ids).
    fn set_id(&mut self, id: Self::Id);
}
