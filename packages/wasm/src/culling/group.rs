//! CullingGroup - distance-band classification of bounding spheres.
//!
//! The group keeps its volumes in a dense array indexed by slot and maps
//! stable [`EntityHandle`]s onto those slots. Band membership is recomputed
//! against the reference point in [`CullingGroup::tick`], which the host calls
//! once per frame. Moving the reference point only records the new position,
//! so a query issued between `set_reference_point` and the next `tick`
//! observes the previous membership.

use std::collections::HashMap;

use log::{debug, info};

use super::event::{BandChangeEvent, BandListener};
use crate::config::{BandThresholds, BeyondOutermost, CullingConfig, validate_capacity};
use crate::entity::{BoundingSphere, Cullable, EntityHandle};
use crate::error::{ConfigError, CullError, CullResult};
use crate::select::select_closest_by;
use crate::spatial::SpatialIndex;

/// Spatial index adapter tracking which distance band each entity is in.
pub struct CullingGroup {
    /// Validated band thresholds
    thresholds: BandThresholds,

    /// Whether the band past the outermost threshold counts as visible
    beyond_outermost: BeyondOutermost,

    /// Reference point the current membership was computed against
    reference: [f32; 3],

    /// Reference point waiting for the next tick
    pending_reference: Option<[f32; 3]>,

    /// Bounding volumes (dense, indexed by slot)
    volumes: Vec<BoundingSphere>,

    /// Current band per slot
    bands: Vec<usize>,

    /// Current visibility per slot
    visible: Vec<bool>,

    /// Slot -> handle
    handles: Vec<EntityHandle>,

    /// Handle -> slot
    slots: HashMap<EntityHandle, usize>,

    /// Next handle to assign on incremental add
    next_handle: u32,

    /// R-tree over the volumes
    spatial: SpatialIndex,

    /// Reusable result buffer for band queries
    query_buffer: Vec<usize>,

    /// Reusable classification buffer
    scratch: Vec<usize>,

    /// Events waiting to be drained when no listener is installed
    events: Vec<BandChangeEvent>,

    /// Push-style receiver for band changes
    listener: Option<Box<dyn BandListener>>,

    /// Set once `destroy()` has run
    disposed: bool,
}

impl CullingGroup {
    /// Create a group sized for `capacity` entities.
    ///
    /// Fails with a configuration error if `capacity` is negative or too
    /// large to preallocate, or the thresholds are not strictly increasing
    /// positive values.
    pub fn initialize(capacity: i64, reference: [f32; 3], thresholds: &[f32]) -> CullResult<Self> {
        let capacity = validate_capacity(capacity)?;
        let thresholds = BandThresholds::new(thresholds)?;
        Ok(Self::build(
            capacity,
            reference,
            thresholds,
            BeyondOutermost::default(),
        )?)
    }

    /// Create a group from a deserialized configuration.
    pub fn from_config(config: &CullingConfig) -> CullResult<Self> {
        let (capacity, thresholds) = config.validate()?;
        Ok(Self::build(
            capacity,
            config.reference_point,
            thresholds,
            config.beyond_outermost,
        )?)
    }

    fn build(
        capacity: usize,
        reference: [f32; 3],
        thresholds: BandThresholds,
        beyond_outermost: BeyondOutermost,
    ) -> Result<Self, ConfigError> {
        let mut slots: HashMap<EntityHandle, usize> = HashMap::new();
        slots
            .try_reserve(capacity)
            .map_err(|_| ConfigError::CapacityTooLarge(capacity as u64))?;

        let group = Self {
            thresholds,
            beyond_outermost,
            reference,
            pending_reference: None,
            volumes: preallocate(capacity)?,
            bands: preallocate(capacity)?,
            visible: preallocate(capacity)?,
            handles: preallocate(capacity)?,
            slots,
            next_handle: 0,
            spatial: SpatialIndex::new(),
            query_buffer: preallocate(capacity)?,
            scratch: preallocate(capacity)?,
            events: Vec::new(),
            listener: None,
            disposed: false,
        };

        info!(
            "culling group initialized: capacity {}, {} bands",
            capacity,
            group.thresholds.outermost_band() + 1
        );
        Ok(group)
    }

    fn ensure_live(&self) -> CullResult<()> {
        if self.disposed {
            Err(CullError::Disposed)
        } else {
            Ok(())
        }
    }

    // =========================================================================
    // Entity Set
    // =========================================================================

    /// Replace the whole tracked set.
    ///
    /// Handles are reset to `0..N-1`, queued events from the previous set are
    /// dropped, and membership is recomputed before returning. A reference
    /// point still waiting for its tick is applied as part of the recompute.
    pub fn set_entities(&mut self, volumes: &[BoundingSphere]) -> CullResult<()> {
        self.ensure_live()?;

        let count = volumes.len();
        let outermost = self.thresholds.outermost_band();

        self.volumes.clear();
        self.volumes.extend_from_slice(volumes);
        self.bands.clear();
        self.bands.resize(count, outermost);
        self.visible.clear();
        self.visible.resize(count, false);

        self.handles.clear();
        self.handles.extend((0..count as u32).map(EntityHandle));
        self.slots.clear();
        self.slots
            .extend(self.handles.iter().enumerate().map(|(slot, &h)| (h, slot)));
        self.next_handle = count as u32;

        self.events.clear();
        self.spatial.rebuild(&self.volumes);

        if let Some(point) = self.pending_reference.take() {
            self.reference = point;
        }
        self.reclassify();
        Ok(())
    }

    /// Replace the tracked set from anything cullable.
    pub fn set_cullables<C: Cullable>(&mut self, items: &[C]) -> CullResult<()> {
        let volumes: Vec<_> = items.iter().map(BoundingSphere::from_cullable).collect();
        self.set_entities(&volumes)
    }

    /// Track one more entity.
    ///
    /// The index is re-synced with the full volume array and the new entity
    /// is classified against the current reference point right away.
    pub fn add_entity(&mut self, volume: BoundingSphere) -> CullResult<EntityHandle> {
        self.ensure_live()?;

        let handle = EntityHandle(self.next_handle);
        self.next_handle += 1;

        let slot = self.volumes.len();
        self.volumes.push(volume);
        self.bands.push(self.thresholds.outermost_band());
        self.visible.push(false);
        self.handles.push(handle);
        self.slots.insert(handle, slot);

        self.spatial.rebuild(&self.volumes);

        let band = self.thresholds.classify(volume.surface_distance(self.reference));
        self.apply(slot, band);
        Ok(handle)
    }

    /// Stop tracking an entity.
    ///
    /// The last slot is moved into the freed one, so the moved entity's slot
    /// index changes while its handle does not. Returns false if the handle is
    /// unknown.
    pub fn remove_entity(&mut self, handle: EntityHandle) -> CullResult<bool> {
        self.ensure_live()?;

        let Some(slot) = self.slots.remove(&handle) else {
            return Ok(false);
        };

        let last = self.volumes.len() - 1;
        self.volumes.swap_remove(slot);
        self.bands.swap_remove(slot);
        self.visible.swap_remove(slot);
        self.handles.swap_remove(slot);
        if slot < last {
            self.slots.insert(self.handles[slot], slot);
        }

        self.events.retain(|event| event.index != slot);
        for event in &mut self.events {
            if event.index == last {
                event.index = slot;
            }
        }

        self.spatial.rebuild(&self.volumes);
        Ok(true)
    }

    // =========================================================================
    // Reference Point
    // =========================================================================

    /// Move the reference point.
    ///
    /// Membership is not recomputed until the next [`tick`](Self::tick).
    /// Setting the point the membership was computed against cancels any
    /// pending move.
    pub fn set_reference_point(&mut self, point: [f32; 3]) -> CullResult<()> {
        self.ensure_live()?;
        self.pending_reference = (point != self.reference).then_some(point);
        Ok(())
    }

    /// Per-frame update: apply a pending reference point and reclassify.
    ///
    /// Returns the number of band changes produced.
    pub fn tick(&mut self) -> CullResult<usize> {
        self.ensure_live()?;

        match self.pending_reference.take() {
            Some(point) => {
                self.reference = point;
                Ok(self.reclassify())
            }
            None => Ok(0),
        }
    }

    fn reclassify(&mut self) -> usize {
        let outermost = self.thresholds.outermost_band();
        self.scratch.clear();
        self.scratch.resize(self.volumes.len(), outermost);

        // Anything the tree does not return is beyond the outermost threshold
        let thresholds = &self.thresholds;
        let scratch = &mut self.scratch;
        self.spatial
            .for_each_within(self.reference, thresholds.outer_limit(), |slot, distance| {
                scratch[slot] = thresholds.classify(distance);
            });

        let mut changed = 0;
        for slot in 0..self.scratch.len() {
            if self.apply(slot, self.scratch[slot]) {
                changed += 1;
            }
        }

        debug!(
            "reclassified {} entities around {:?}: {} changed",
            self.volumes.len(),
            self.reference,
            changed
        );
        changed
    }

    /// Record a slot's new band, emitting an event if anything changed.
    fn apply(&mut self, slot: usize, band: usize) -> bool {
        let is_visible = self.is_band_visible(band);
        let previous_band = self.bands[slot];
        let was_visible = self.visible[slot];

        if previous_band == band && was_visible == is_visible {
            return false;
        }

        self.bands[slot] = band;
        self.visible[slot] = is_visible;

        let event = BandChangeEvent {
            index: slot,
            previous_band,
            current_band: band,
            was_visible,
            is_visible,
        };
        match self.listener.as_mut() {
            Some(listener) => listener.on_band_changed(&event),
            None => self.events.push(event),
        }
        true
    }

    /// Whether entities in `band` count as visible.
    #[inline]
    pub fn is_band_visible(&self, band: usize) -> bool {
        band < self.thresholds.outermost_band()
            || self.beyond_outermost == BeyondOutermost::Visible
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Slots currently in `band` whose visibility equals `visible_only`.
    ///
    /// Scanning starts at slot `first_index`. The returned slice borrows a
    /// buffer that is reused by the next query; its length is the valid count.
    pub fn query_band(
        &mut self,
        band: usize,
        visible_only: bool,
        first_index: usize,
    ) -> CullResult<&[usize]> {
        self.ensure_live()?;
        self.check_band(band)?;

        self.query_buffer.clear();
        let bands = &self.bands;
        let visible = &self.visible;
        self.query_buffer.extend(
            (first_index..bands.len())
                .filter(|&slot| bands[slot] == band && visible[slot] == visible_only),
        );
        Ok(&self.query_buffer)
    }

    /// Like [`query_band`](Self::query_band) but writes into a caller buffer,
    /// stopping when it is full. Returns the number of slots written.
    pub fn query_band_into(
        &self,
        band: usize,
        visible_only: bool,
        first_index: usize,
        out: &mut [usize],
    ) -> CullResult<usize> {
        self.ensure_live()?;
        self.check_band(band)?;

        let matches = (first_index..self.bands.len())
            .filter(|&slot| self.bands[slot] == band && self.visible[slot] == visible_only);

        let mut count = 0;
        for (dst, slot) in out.iter_mut().zip(matches) {
            *dst = slot;
            count += 1;
        }
        Ok(count)
    }

    /// The visible slot in `band` closest to the reference point.
    pub fn closest_in_band(&mut self, band: usize) -> CullResult<usize> {
        self.query_band(band, true, 0)?;
        let volumes = &self.volumes;
        select_closest_by(&self.query_buffer, self.reference, |slot| {
            volumes.get(slot).map(|v| v.center)
        })
    }

    fn check_band(&self, band: usize) -> CullResult<()> {
        let max = self.thresholds.outermost_band();
        if band > max {
            return Err(CullError::BandOutOfRange { band, max });
        }
        Ok(())
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Take every queued band change.
    pub fn drain_events(&mut self) -> CullResult<std::vec::Drain<'_, BandChangeEvent>> {
        self.ensure_live()?;
        Ok(self.events.drain(..))
    }

    /// Deliver band changes to `listener` as they happen instead of queueing.
    ///
    /// Events already queued stay queued.
    pub fn set_listener<L: BandListener + 'static>(&mut self, listener: L) -> CullResult<()> {
        self.ensure_live()?;
        self.listener = Some(Box::new(listener));
        Ok(())
    }

    /// Go back to queueing events.
    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release the index and tables. Every later operation fails with
    /// [`CullError::Disposed`], including a second `destroy`.
    pub fn destroy(&mut self) -> CullResult<()> {
        self.ensure_live()?;

        self.spatial.clear();
        self.volumes = Vec::new();
        self.bands = Vec::new();
        self.visible = Vec::new();
        self.handles = Vec::new();
        self.slots = HashMap::new();
        self.query_buffer = Vec::new();
        self.scratch = Vec::new();
        self.events = Vec::new();
        self.listener = None;
        self.pending_reference = None;
        self.disposed = true;

        info!("culling group destroyed");
        Ok(())
    }

    /// Whether `destroy()` has run.
    pub fn is_destroyed(&self) -> bool {
        self.disposed
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// Whether no entity is tracked.
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Number of bands (`thresholds + 1`).
    pub fn band_count(&self) -> usize {
        self.thresholds.outermost_band() + 1
    }

    /// Index of the band beyond the outermost threshold.
    pub fn outermost_band(&self) -> usize {
        self.thresholds.outermost_band()
    }

    /// The configured thresholds.
    pub fn thresholds(&self) -> &[f32] {
        self.thresholds.as_slice()
    }

    /// Reference point the current membership reflects.
    pub fn reference_point(&self) -> [f32; 3] {
        self.reference
    }

    /// Whether a reference point move is waiting for the next tick.
    pub fn has_pending_update(&self) -> bool {
        self.pending_reference.is_some()
    }

    /// Current band of a slot.
    pub fn band_of(&self, slot: usize) -> Option<usize> {
        self.bands.get(slot).copied()
    }

    /// Current visibility of a slot.
    pub fn is_visible(&self, slot: usize) -> Option<bool> {
        self.visible.get(slot).copied()
    }

    /// Slot currently holding `handle`.
    pub fn slot_of(&self, handle: EntityHandle) -> Option<usize> {
        self.slots.get(&handle).copied()
    }

    /// Handle of the entity in `slot`.
    pub fn handle_at(&self, slot: usize) -> Option<EntityHandle> {
        self.handles.get(slot).copied()
    }

    /// Bounding volume in `slot`.
    pub fn volume(&self, slot: usize) -> Option<&BoundingSphere> {
        self.volumes.get(slot)
    }

    /// All bounding volumes in slot order.
    pub fn volumes(&self) -> &[BoundingSphere] {
        &self.volumes
    }
}

/// Reserve room for `capacity` elements without aborting on overflow.
fn preallocate<T>(capacity: usize) -> Result<Vec<T>, ConfigError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(capacity)
        .map_err(|_| ConfigError::CapacityTooLarge(capacity as u64))?;
    Ok(buffer)
}
