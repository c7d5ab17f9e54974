//! R-tree based spatial index using the rstar crate.
//!
//! Entries are bounding spheres tagged with their slot in the dense volume
//! array. Distances are measured to the sphere surface, so a reference point
//! inside a sphere is at distance zero from it.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::entity::BoundingSphere;

/// A bounding sphere stored in the index together with its slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereEntry {
    /// Slot in the dense volume array.
    pub slot: usize,
    /// The sphere itself.
    pub sphere: BoundingSphere,
}

impl SphereEntry {
    /// Create a new entry.
    pub fn new(slot: usize, sphere: BoundingSphere) -> Self {
        Self { slot, sphere }
    }
}

impl RTreeObject for SphereEntry {
    type Envelope = AABB<[f32; 3]>;

    fn envelope(&self) -> Self::Envelope {
        let [x, y, z] = self.sphere.center;
        let r = self.sphere.radius;
        AABB::from_corners([x - r, y - r, z - r], [x + r, y + r, z + r])
    }
}

impl PointDistance for SphereEntry {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let d = self.sphere.surface_distance(*point);
        d * d
    }
}

/// Spatial index for tracked bounding spheres.
///
/// Uses an R*-tree. The tree is rebuilt wholesale whenever the volume set
/// changes; entity counts are small enough that bulk loading beats
/// incremental maintenance.
pub struct SpatialIndex {
    tree: RTree<SphereEntry>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Rebuild the index from the dense volume array. Slot `i` is `volumes[i]`.
    pub fn rebuild(&mut self, volumes: &[BoundingSphere]) {
        let entries: Vec<_> = volumes
            .iter()
            .enumerate()
            .map(|(slot, &sphere)| SphereEntry::new(slot, sphere))
            .collect();

        self.tree = RTree::bulk_load(entries);
    }

    /// Visit every entry whose surface lies within `max_distance` of `point`.
    ///
    /// The callback receives the slot and the surface distance. Order is the
    /// tree's traversal order and carries no meaning.
    pub fn for_each_within<F>(&self, point: [f32; 3], max_distance: f32, mut f: F)
    where
        F: FnMut(usize, f32),
    {
        let max_distance_sq = max_distance * max_distance;
        for entry in self.tree.locate_within_distance(point, max_distance_sq) {
            f(entry.slot, entry.sphere.surface_distance(point));
        }
    }

    /// Clear all entries from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
