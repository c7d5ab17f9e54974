//! Explicit factory for scene items.
//!
//! Items are scattered uniformly over a disc on the XZ plane. The generator
//! is passed to whoever needs it; there is no global instance.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::highlightable::{HighlightPalette, Highlightable};

/// Default radius of the spawn disc.
pub const DEFAULT_SPAWN_RADIUS: f32 = 30.0;

/// Spawns [`Highlightable`] items inside a disc around the origin.
#[derive(Debug, Clone)]
pub struct EntityGenerator {
    rng: SmallRng,
    radius: f32,
    extents: [f32; 3],
    palette: HighlightPalette,
}

impl EntityGenerator {
    /// Create a generator with a fixed seed, so scenes are reproducible.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            radius: DEFAULT_SPAWN_RADIUS,
            extents: [0.5; 3],
            palette: HighlightPalette::default(),
        }
    }

    /// Set the spawn disc radius.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    /// Set the half-size of spawned items.
    pub fn with_extents(mut self, extents: [f32; 3]) -> Self {
        self.extents = extents;
        self
    }

    /// Set the palette of spawned items.
    pub fn with_palette(mut self, palette: HighlightPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Spawn one item.
    pub fn spawn(&mut self) -> Highlightable {
        let [x, z] = self.inside_unit_circle();
        Highlightable::new(
            [x * self.radius, 0.0, z * self.radius],
            self.extents,
            self.palette,
        )
    }

    /// Spawn `count` items.
    pub fn spawn_many(&mut self, count: usize) -> Vec<Highlightable> {
        (0..count).map(|_| self.spawn()).collect()
    }

    fn inside_unit_circle(&mut self) -> [f32; 2] {
        // sqrt keeps the density uniform over the area
        let r = self.rng.random::<f32>().sqrt();
        let theta = self.rng.random_range(0.0..std::f32::consts::TAU);
        [r * theta.cos(), r * theta.sin()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Cullable;

    #[test]
    fn test_spawn_within_radius() {
        let mut generator = EntityGenerator::new(7).with_radius(12.0);
        for item in generator.spawn_many(200) {
            let [x, y, z] = item.position();
            assert_eq!(y, 0.0);
            assert!((x * x + z * z).sqrt() <= 12.0 + 1e-4);
        }
    }

    #[test]
    fn test_same_seed_same_scene() {
        let a = EntityGenerator::new(42).spawn_many(16);
        let b = EntityGenerator::new(42).spawn_many(16);
        assert_eq!(a, b);
    }

    #[test]
    fn test_extents_carried_over() {
        let item = EntityGenerator::new(1).with_extents([2.0, 1.0, 1.0]).spawn();
        assert_eq!(item.extents(), [2.0, 1.0, 1.0]);
    }
}
