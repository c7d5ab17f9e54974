//! Tracked entity types.
//!
//! An entity is known to the culling core by a stable handle, a bounding
//! sphere captured at registration, and a small set of state flags owned by
//! whoever drives the visuals.

mod handle;
mod volume;

pub use handle::{EntityHandle, EntityState};
pub use volume::{BoundingSphere, Cullable, distance_squared};
