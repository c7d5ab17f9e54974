//! Items that can be shown, hidden and highlighted.

use serde::{Deserialize, Serialize};

use crate::entity::{Cullable, EntityState};

/// Base and highlight colors, RGBA in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightPalette {
    pub base: [f32; 4],
    pub highlight: [f32; 4],
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            base: [0.8, 0.8, 0.8, 1.0],
            highlight: [1.0, 0.85, 0.1, 1.0],
        }
    }
}

/// A scene item tracked by the culling group.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlightable {
    position: [f32; 3],
    extents: [f32; 3],
    palette: HighlightPalette,
}

impl Highlightable {
    /// Create an item at `position` with half-size `extents`.
    pub fn new(position: [f32; 3], extents: [f32; 3], palette: HighlightPalette) -> Self {
        Self {
            position,
            extents,
            palette,
        }
    }

    /// Color to draw the item with for a given state.
    pub fn color(&self, state: EntityState) -> [f32; 4] {
        if state.is_highlighted() {
            self.palette.highlight
        } else {
            self.palette.base
        }
    }

    /// The item's palette.
    pub fn palette(&self) -> &HighlightPalette {
        &self.palette
    }
}

impl Cullable for Highlightable {
    fn position(&self) -> [f32; 3] {
        self.position
    }

    fn extents(&self) -> [f32; 3] {
        self.extents
    }
}
