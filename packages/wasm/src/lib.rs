//! Proximity Cull - WASM Module
//!
//! This module sorts tracked entities into concentric distance bands around a
//! moving reference point and picks the closest entity of a band. It is
//! compiled to WebAssembly and exposes a JavaScript-friendly API via
//! wasm-bindgen; the same types are usable natively as an rlib.
//!
//! # Architecture
//!
//! - `config`: band thresholds and group configuration
//! - `entity`: handles, bounding spheres, per-entity state flags
//! - `spatial`: R-tree index over bounding spheres
//! - `culling`: the culling group (band membership, queries, change events)
//! - `select`: closest-in-band selection and the highlight state machine
//! - `scene`: a complete highlight scene driven by a moving player

use js_sys::{Float32Array, Function};
use log::{LevelFilter, warn};
use wasm_bindgen::prelude::*;

pub mod config;
pub mod culling;
pub mod entity;
pub mod error;
pub mod logger;
pub mod scene;
pub mod select;
pub mod spatial;

use config::CullingConfig;
use culling::{BandChangeEvent, BandListener, CullingGroup};
use entity::{BoundingSphere, Cullable, EntityHandle};
use scene::{CullingScene, EntityGenerator, Player, ReferenceSource, SceneConfig};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logger::init(LevelFilter::Info);
}

/// Change the console log level ("error", "warn", "info", "debug", "trace").
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) {
    logger::init(logger::parse_level(level));
}

/// Build bounding spheres from flat `[x0, y0, z0, x1, ...]` centers and one
/// radius per center. Returns `None` if the lengths disagree.
pub fn volumes_from_flat(centers: &[f32], radii: &[f32]) -> Option<Vec<BoundingSphere>> {
    if centers.len() != radii.len() * 3 {
        return None;
    }

    Some(
        centers
            .chunks_exact(3)
            .zip(radii)
            .map(|(c, &r)| BoundingSphere::new([c[0], c[1], c[2]], r))
            .collect(),
    )
}

/// Split flat `[x0, y0, z0, x1, ...]` coordinates into points. Returns `None`
/// if the length is not a multiple of three.
pub fn points_from_flat(coords: &[f32]) -> Option<Vec<[f32; 3]>> {
    if coords.len() % 3 != 0 {
        return None;
    }

    Some(
        coords
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect(),
    )
}

/// Forwards band changes to a JavaScript callback taking one event object.
struct JsBandListener {
    callback: Function,
}

impl BandListener for JsBandListener {
    fn on_band_changed(&mut self, event: &BandChangeEvent) {
        let result = serde_wasm_bindgen::to_value(event)
            .map_err(JsValue::from)
            .and_then(|value| self.callback.call1(&JsValue::NULL, &value));
        if let Err(err) = result {
            warn!("band listener failed: {:?}", err);
        }
    }
}

fn to_js_error<E: std::fmt::Display>(err: E) -> JsError {
    JsError::new(&err.to_string())
}

/// Distance-band culling group exposed to JavaScript.
///
/// Wraps [`CullingGroup`]; slot indices and handles cross the boundary as u32.
#[wasm_bindgen]
pub struct ProximityCullWasm {
    group: CullingGroup,
}

#[wasm_bindgen]
impl ProximityCullWasm {
    /// Create a group for `capacity` entities with the given thresholds.
    #[wasm_bindgen(constructor)]
    pub fn new(capacity: i32, thresholds: &[f32]) -> Result<ProximityCullWasm, JsError> {
        let group =
            CullingGroup::initialize(capacity as i64, [0.0; 3], thresholds).map_err(to_js_error)?;
        Ok(Self { group })
    }

    /// Create a group from a plain configuration object
    /// (`{ capacity, thresholds, referencePoint, beyondOutermost }`).
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config: JsValue) -> Result<ProximityCullWasm, JsError> {
        let config: CullingConfig = serde_wasm_bindgen::from_value(config).map_err(to_js_error)?;
        let group = CullingGroup::from_config(&config).map_err(to_js_error)?;
        Ok(Self { group })
    }

    // =========================================================================
    // Entity Set
    // =========================================================================

    /// Replace every entity. `centers` is `[x0, y0, z0, x1, ...]`, one radius
    /// per center. Handles restart at 0.
    #[wasm_bindgen(js_name = setEntities)]
    pub fn set_entities(&mut self, centers: &[f32], radii: &[f32]) -> Result<(), JsError> {
        let volumes = volumes_from_flat(centers, radii)
            .ok_or_else(|| JsError::new("centers must hold three values per radius"))?;
        self.group.set_entities(&volumes).map_err(to_js_error)
    }

    /// Add one entity, returning its handle.
    #[wasm_bindgen(js_name = addEntity)]
    pub fn add_entity(&mut self, x: f32, y: f32, z: f32, radius: f32) -> Result<u32, JsError> {
        self.group
            .add_entity(BoundingSphere::new([x, y, z], radius))
            .map(EntityHandle::raw)
            .map_err(to_js_error)
    }

    /// Remove an entity by handle. Returns false if the handle is unknown.
    #[wasm_bindgen(js_name = removeEntity)]
    pub fn remove_entity(&mut self, handle: u32) -> Result<bool, JsError> {
        self.group
            .remove_entity(EntityHandle(handle))
            .map_err(to_js_error)
    }

    // =========================================================================
    // Reference Point
    // =========================================================================

    /// Move the reference point. Takes effect on the next `tick()`.
    #[wasm_bindgen(js_name = setReferencePoint)]
    pub fn set_reference_point(&mut self, x: f32, y: f32, z: f32) -> Result<(), JsError> {
        self.group
            .set_reference_point([x, y, z])
            .map_err(to_js_error)
    }

    /// Per-frame update. Returns the number of band changes.
    pub fn tick(&mut self) -> Result<u32, JsError> {
        self.group
            .tick()
            .map(|changed| changed as u32)
            .map_err(to_js_error)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Slots in `band` whose visibility equals `visibleOnly`, scanning from
    /// `firstIndex`.
    #[wasm_bindgen(js_name = queryBand)]
    pub fn query_band(
        &mut self,
        band: u32,
        visible_only: bool,
        first_index: u32,
    ) -> Result<Vec<u32>, JsError> {
        self.group
            .query_band(band as usize, visible_only, first_index as usize)
            .map(|slots| slots.iter().map(|&slot| slot as u32).collect())
            .map_err(to_js_error)
    }

    /// The visible slot in `band` closest to the reference point.
    #[wasm_bindgen(js_name = closestInBand)]
    pub fn closest_in_band(&mut self, band: u32) -> Result<u32, JsError> {
        self.group
            .closest_in_band(band as usize)
            .map(|slot| slot as u32)
            .map_err(to_js_error)
    }

    /// Current band of a slot.
    #[wasm_bindgen(js_name = bandOf)]
    pub fn band_of(&self, slot: u32) -> Option<u32> {
        self.group.band_of(slot as usize).map(|band| band as u32)
    }

    /// Slot currently holding a handle.
    #[wasm_bindgen(js_name = slotOf)]
    pub fn slot_of(&self, handle: u32) -> Option<u32> {
        self.group
            .slot_of(EntityHandle(handle))
            .map(|slot| slot as u32)
    }

    /// Handle of the entity in a slot.
    #[wasm_bindgen(js_name = handleAt)]
    pub fn handle_at(&self, slot: u32) -> Option<u32> {
        self.group.handle_at(slot as usize).map(EntityHandle::raw)
    }

    /// Number of tracked entities.
    #[wasm_bindgen(js_name = entityCount)]
    pub fn entity_count(&self) -> u32 {
        self.group.len() as u32
    }

    /// Number of bands (thresholds + 1).
    #[wasm_bindgen(js_name = bandCount)]
    pub fn band_count(&self) -> u32 {
        self.group.band_count() as u32
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Take queued band changes as an array of
    /// `{ index, previousBand, currentBand, wasVisible, isVisible }`.
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> Result<JsValue, JsError> {
        let events: Vec<BandChangeEvent> = self.group.drain_events().map_err(to_js_error)?.collect();
        serde_wasm_bindgen::to_value(&events).map_err(to_js_error)
    }

    /// Deliver band changes to `callback` instead of queueing them.
    #[wasm_bindgen(js_name = setListener)]
    pub fn set_listener(&mut self, callback: Function) -> Result<(), JsError> {
        self.group
            .set_listener(JsBandListener { callback })
            .map_err(to_js_error)
    }

    /// Go back to queueing band changes.
    #[wasm_bindgen(js_name = clearListener)]
    pub fn clear_listener(&mut self) {
        self.group.clear_listener();
    }

    /// Release the group. Every later call throws.
    pub fn destroy(&mut self) -> Result<(), JsError> {
        self.group.destroy().map_err(to_js_error)
    }
}

/// Index of the candidate closest to the reference point.
///
/// `positions` is `[x0, y0, z0, x1, ...]`. Throws on an empty candidate list.
#[wasm_bindgen(js_name = selectClosest)]
pub fn select_closest(
    candidates: &[u32],
    positions: &[f32],
    x: f32,
    y: f32,
    z: f32,
) -> Result<u32, JsError> {
    let candidates: Vec<usize> = candidates.iter().map(|&c| c as usize).collect();
    let positions = points_from_flat(positions)
        .ok_or_else(|| JsError::new("positions must hold three values per point"))?;
    select::select_closest(&candidates, &positions, [x, y, z])
        .map(|index| index as u32)
        .map_err(to_js_error)
}

/// A complete highlight scene with a player-driven reference point.
#[wasm_bindgen]
pub struct CullingSceneWasm {
    scene: CullingScene,
    player: Player,
}

#[wasm_bindgen]
impl CullingSceneWasm {
    /// Create a scene from a plain configuration object
    /// (`{ itemCount, thresholds, activeBand, beyondOutermost }`).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, seed: u32) -> Result<CullingSceneWasm, JsError> {
        let config: SceneConfig = if config.is_undefined() || config.is_null() {
            SceneConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };

        let mut generator = EntityGenerator::new(u64::from(seed));
        let player = Player::default();
        let scene = CullingScene::new(&config, &mut generator, player.position())
            .map_err(to_js_error)?;
        Ok(Self { scene, player })
    }

    /// Apply one frame of axis input and update the scene.
    /// Returns the number of band changes handled.
    pub fn update(&mut self, horizontal: f32, vertical: f32, dt: f32) -> Result<u32, JsError> {
        self.player.update(horizontal, vertical, dt);
        self.scene
            .tick(&mut self.player)
            .map(|handled| handled as u32)
            .map_err(to_js_error)
    }

    /// Show a different band.
    #[wasm_bindgen(js_name = setActiveBand)]
    pub fn set_active_band(&mut self, band: u32) -> Result<(), JsError> {
        self.scene
            .set_active_band(band as usize)
            .map_err(to_js_error)
    }

    /// Index of the highlighted item.
    pub fn highlighted(&self) -> Option<u32> {
        self.scene.highlighted().map(|i| i as u32)
    }

    /// Indices of the items currently shown.
    #[wasm_bindgen(js_name = activeIndices)]
    pub fn active_indices(&self) -> Vec<u32> {
        self.scene
            .active_indices()
            .into_iter()
            .map(|i| i as u32)
            .collect()
    }

    /// Item positions as `[x0, y0, z0, x1, ...]`.
    pub fn positions(&self) -> Float32Array {
        let flat: Vec<f32> = self
            .scene
            .items()
            .iter()
            .flat_map(|item| item.position())
            .collect();
        Float32Array::from(flat.as_slice())
    }

    /// Item colors as `[r0, g0, b0, a0, r1, ...]`.
    pub fn colors(&self) -> Float32Array {
        let flat: Vec<f32> = self
            .scene
            .items()
            .iter()
            .zip(self.scene.states())
            .flat_map(|(item, &state)| item.color(state))
            .collect();
        Float32Array::from(flat.as_slice())
    }

    /// Player position as `[x, y, z]`.
    #[wasm_bindgen(js_name = playerPosition)]
    pub fn player_position(&self) -> Vec<f32> {
        self.player.position().to_vec()
    }

    /// Tear the scene down.
    pub fn destroy(&mut self) -> Result<(), JsError> {
        self.scene.destroy().map_err(to_js_error)
    }
}
