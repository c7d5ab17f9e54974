//! Entity handles and per-entity state flags.
//!
//! Handles are caller-facing identifiers. They stay valid across incremental
//! adds and removes, but a full `set_entities` replace hands out fresh handles
//! `0..N-1`, so old handles must not be reused after one.

use std::fmt;

/// Stable entity identifier, distinct from the entity's slot in the dense
/// volume array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(pub u32);

impl EntityHandle {
    /// The raw value handed across the JS boundary.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Entity state flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityState {
    flags: u8,
}

impl EntityState {
    const ACTIVE: u8 = 0b0000_0001;
    const HIGHLIGHTED: u8 = 0b0000_0010;

    /// Create a new default state: inactive, not highlighted.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the entity is active (shown) in the scene.
    #[inline]
    pub fn is_active(self) -> bool {
        self.flags & Self::ACTIVE != 0
    }

    /// Set the active state.
    #[inline]
    pub fn set_active(&mut self, active: bool) {
        self.set(Self::ACTIVE, active);
    }

    /// Check if the entity is highlighted.
    #[inline]
    pub fn is_highlighted(self) -> bool {
        self.flags & Self::HIGHLIGHTED != 0
    }

    /// Set the highlighted state.
    #[inline]
    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.set(Self::HIGHLIGHTED, highlighted);
    }

    #[inline]
    fn set(&mut self, flag: u8, on: bool) {
        if on {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }
}
