//! Bounding spheres and the trait for things that can be culled.

use serde::{Deserialize, Serialize};

/// Squared Euclidean distance between two points.
#[inline]
pub fn distance_squared(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// A sphere approximating an entity's spatial extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    /// Center in world space.
    pub center: [f32; 3],
    /// Radius, never negative.
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a bounding sphere. Negative radii are clamped to zero.
    pub fn new(center: [f32; 3], radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Build the sphere for a cullable, taking the radius from the x extent.
    pub fn from_cullable<C: Cullable + ?Sized>(cullable: &C) -> Self {
        Self::new(cullable.position(), cullable.extents()[0])
    }

    /// Distance from `point` to the sphere's surface, zero when inside.
    #[inline]
    pub fn surface_distance(&self, point: [f32; 3]) -> f32 {
        (distance_squared(self.center, point).sqrt() - self.radius).max(0.0)
    }
}

/// Anything that exposes a world position and a half-size.
///
/// The radius of the bounding sphere is derived once from `extents()[0]` at
/// registration; later changes to the extents are not picked up.
pub trait Cullable {
    /// Current world position.
    fn position(&self) -> [f32; 3];

    /// Half-size along each axis.
    fn extents(&self) -> [f32; 3];
}
