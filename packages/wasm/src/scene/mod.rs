//! Scene glue around the culling core.
//!
//! A [`CullingScene`] owns the highlightable items and a [`CullingGroup`],
//! follows a moving reference point, shows only the items in the active
//! band, and keeps the closest of them highlighted.
//!
//! [`CullingGroup`]: crate::culling::CullingGroup

mod controller;
mod generator;
mod highlightable;
mod player;

pub use controller::{CullingScene, SceneConfig};
pub use generator::EntityGenerator;
pub use highlightable::{HighlightPalette, Highlightable};
pub use player::{Player, ReferenceSource};
