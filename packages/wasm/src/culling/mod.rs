//! Distance-band culling.
//!
//! A [`CullingGroup`] owns the bounding volumes of every tracked entity,
//! classifies them into distance bands around a moving reference point, and
//! reports band changes either by polling or through a [`BandListener`].

mod event;
mod group;

pub use event::{BandChangeEvent, BandListener};
pub use group::CullingGroup;
