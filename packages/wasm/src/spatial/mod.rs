//! Spatial partitioning over bounding spheres.
//!
//! This module provides an R-tree based index that prunes entities beyond a
//! distance from the reference point before band classification.

mod rtree;

pub use rtree::{SpatialIndex, SphereEntry};
