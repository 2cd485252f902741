//! Entity trait: identity assigned by storage.

/// A record whose identity is handed out by the store on first save.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Identifier, or `None` while the record has never been saved.
    fn id(&self) -> Option<Self::Id>;

    /// True until the store has assigned an identifier.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }
}
