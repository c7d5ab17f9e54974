//! CullingScene - the per-frame consumer of the culling core.
//!
//! Each tick the scene forwards the reference point, lets the group
//! reclassify, shows only the items in the active band, and moves the
//! highlight to the closest visible item of that band.

use log::debug;
use serde::{Deserialize, Serialize};

use super::generator::EntityGenerator;
use super::highlightable::Highlightable;
use super::player::ReferenceSource;
use crate::config::{BeyondOutermost, CullingConfig};
use crate::culling::CullingGroup;
use crate::entity::{BoundingSphere, Cullable, EntityState};
use crate::error::{ConfigError, CullError, CullResult};
use crate::select::{HighlightTracker, select_closest_by};

/// Thresholds used by the highlight scene.
pub const SCENE_THRESHOLDS: [f32; 5] = [2.0, 4.0, 8.0, 16.0, 32.0];

/// Scene setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    /// Number of items to spawn.
    pub item_count: usize,
    /// Distance-band thresholds.
    pub thresholds: Vec<f32>,
    /// Band whose items are shown and highlighted.
    pub active_band: usize,
    /// Treatment of the band beyond the outermost threshold.
    pub beyond_outermost: BeyondOutermost,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            item_count: 64,
            thresholds: SCENE_THRESHOLDS.to_vec(),
            active_band: 0,
            beyond_outermost: BeyondOutermost::Culled,
        }
    }
}

/// Items, their visual state, and the culling group that classifies them.
pub struct CullingScene {
    items: Vec<Highlightable>,
    states: Vec<EntityState>,
    group: CullingGroup,
    active_band: usize,
    highlight: HighlightTracker,
}

impl CullingScene {
    /// Spawn `config.item_count` items from `generator` and classify them
    /// around `reference`.
    pub fn new(
        config: &SceneConfig,
        generator: &mut EntityGenerator,
        reference: [f32; 3],
    ) -> CullResult<Self> {
        if config.active_band > config.thresholds.len() {
            return Err(ConfigError::ActiveBandOutOfRange {
                band: config.active_band,
                max: config.thresholds.len(),
            }
            .into());
        }

        let group = CullingGroup::from_config(&CullingConfig {
            capacity: config.item_count as i64,
            thresholds: config.thresholds.clone(),
            reference_point: reference,
            beyond_outermost: config.beyond_outermost,
        })?;

        let mut scene = Self {
            items: Vec::new(),
            states: Vec::new(),
            group,
            active_band: config.active_band,
            highlight: HighlightTracker::new(),
        };
        scene.replace_items(generator.spawn_many(config.item_count))?;
        Ok(scene)
    }

    /// Per-frame update.
    ///
    /// Returns the number of band changes handled.
    pub fn tick<S: ReferenceSource + ?Sized>(&mut self, source: &mut S) -> CullResult<usize> {
        let moved = source.take_moved();
        if moved {
            self.group.set_reference_point(source.position())?;
        }
        self.group.tick()?;

        let handled = self.process_events()?;
        // The closest item can change without any band change
        if moved || handled > 0 {
            self.update_highlighting()?;
        }
        Ok(handled)
    }

    /// Switch the band whose items are shown.
    pub fn set_active_band(&mut self, band: usize) -> CullResult<()> {
        let max = self.group.outermost_band();
        if band > max {
            return Err(CullError::BandOutOfRange { band, max });
        }

        self.active_band = band;
        self.refresh_active();
        self.update_highlighting()
    }

    /// Replace every item. Old indices are invalid afterwards.
    pub fn replace_items(&mut self, items: Vec<Highlightable>) -> CullResult<()> {
        self.highlight.clear(&mut self.states);
        self.group.set_cullables(&items)?;

        self.states = vec![EntityState::new(); items.len()];
        self.items = items;

        // Items that never leave the outermost band produce no event
        self.group.drain_events()?.for_each(drop);
        self.refresh_active();
        self.update_highlighting()
    }

    /// Add one item, returning its index.
    pub fn add_item(&mut self, item: Highlightable) -> CullResult<usize> {
        let volume = BoundingSphere::from_cullable(&item);
        let handle = self.group.add_entity(volume)?;

        self.items.push(item);
        self.states.push(EntityState::new());
        let index = self.items.len() - 1;
        debug!("added item {} as {}", index, handle);

        if self.process_events()? > 0 {
            self.update_highlighting()?;
        }
        Ok(index)
    }

    /// Tear down the culling group. The scene is unusable afterwards.
    pub fn destroy(&mut self) -> CullResult<()> {
        self.highlight.clear(&mut self.states);
        self.group.destroy()
    }

    fn process_events(&mut self) -> CullResult<usize> {
        let mut handled = 0;
        for event in self.group.drain_events()? {
            if let Some(state) = self.states.get_mut(event.index) {
                state.set_active(event.current_band == self.active_band);
            }
            handled += 1;
        }
        Ok(handled)
    }

    fn refresh_active(&mut self) {
        for (slot, state) in self.states.iter_mut().enumerate() {
            state.set_active(self.group.band_of(slot) == Some(self.active_band));
        }
    }

    fn update_highlighting(&mut self) -> CullResult<()> {
        let reference = self.group.reference_point();
        let visible = self.group.is_band_visible(self.active_band);
        let candidates = self.group.query_band(self.active_band, visible, 0)?;

        let items = &self.items;
        match select_closest_by(candidates, reference, |i| items.get(i).map(|it| it.position())) {
            Ok(closest) => {
                self.highlight.select(closest, &mut self.states);
                Ok(())
            }
            Err(CullError::EmptySet) => {
                debug!("band {} is empty, clearing highlight", self.active_band);
                self.highlight.clear(&mut self.states);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// All items in slot order.
    pub fn items(&self) -> &[Highlightable] {
        &self.items
    }

    /// Visual state of every item.
    pub fn states(&self) -> &[EntityState] {
        &self.states
    }

    /// Index of the highlighted item.
    pub fn highlighted(&self) -> Option<usize> {
        self.highlight.current()
    }

    /// Indices of items currently shown.
    pub fn active_indices(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_active())
            .map(|(i, _)| i)
            .collect()
    }

    /// The band being shown.
    pub fn active_band(&self) -> usize {
        self.active_band
    }

    /// The underlying culling group.
    pub fn group(&self) -> &CullingGroup {
        &self.group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::distance_squared;
    use crate::scene::{HighlightPalette, Player};

    fn item(x: f32, z: f32) -> Highlightable {
        Highlightable::new([x, 0.0, z], [0.0; 3], HighlightPalette::default())
    }

    fn empty_scene(active_band: usize) -> CullingScene {
        let config = SceneConfig {
            item_count: 0,
            active_band,
            ..SceneConfig::default()
        };
        CullingScene::new(&config, &mut EntityGenerator::new(0), [0.0; 3]).unwrap()
    }

    #[test]
    fn test_rejects_active_band_past_outermost() {
        let config = SceneConfig {
            active_band: 6,
            ..SceneConfig::default()
        };
        let result = CullingScene::new(&config, &mut EntityGenerator::new(0), [0.0; 3]);
        assert!(matches!(
            result,
            Err(CullError::Config(ConfigError::ActiveBandOutOfRange { band: 6, max: 5 }))
        ));
    }

    #[test]
    fn test_shows_and_highlights_active_band() {
        let mut scene = empty_scene(1);
        scene
            .replace_items(vec![item(3.0, 0.0), item(0.0, 2.5), item(10.0, 0.0), item(1.0, 0.0)])
            .unwrap();

        assert_eq!(scene.active_indices(), vec![0, 1]);
        assert_eq!(scene.highlighted(), Some(1));
        assert!(scene.states()[1].is_highlighted());
        assert_eq!(scene.states().iter().filter(|s| s.is_highlighted()).count(), 1);
    }

    #[test]
    fn test_highlight_follows_player() {
        let mut scene = empty_scene(0);
        scene
            .replace_items(vec![item(1.0, 0.0), item(10.0, 0.0)])
            .unwrap();
        assert_eq!(scene.highlighted(), Some(0));

        let mut player = Player::default();
        player.teleport([9.0, 0.0, 0.0]);
        // Not applied until the scene ticks
        assert_eq!(scene.highlighted(), Some(0));

        let changed = scene.tick(&mut player).unwrap();
        assert_eq!(changed, 2);
        assert_eq!(scene.active_indices(), vec![1]);
        assert_eq!(scene.highlighted(), Some(1));
        assert!(!scene.states()[0].is_highlighted());

        // Idle tick does nothing
        assert_eq!(scene.tick(&mut player).unwrap(), 0);
    }

    #[test]
    fn test_highlight_follows_player_within_band() {
        let mut scene = empty_scene(0);
        scene
            .replace_items(vec![item(1.0, 0.0), item(-1.5, 0.0)])
            .unwrap();
        assert_eq!(scene.highlighted(), Some(0));

        // Both items stay in band 0, only their order by distance flips
        let mut player = Player::default();
        player.teleport([-0.5, 0.0, 0.0]);
        let changed = scene.tick(&mut player).unwrap();

        assert_eq!(changed, 0);
        assert_eq!(scene.active_indices(), vec![0, 1]);
        assert_eq!(scene.highlighted(), Some(1));
        assert!(scene.states()[1].is_highlighted());
        assert!(!scene.states()[0].is_highlighted());
    }

    #[test]
    fn test_empty_band_clears_highlight() {
        let mut scene = empty_scene(0);
        scene.replace_items(vec![item(1.0, 0.0)]).unwrap();
        assert_eq!(scene.highlighted(), Some(0));

        let mut player = Player::new([20.0, 0.0, 0.0]);
        scene.tick(&mut player).unwrap();
        assert_eq!(scene.highlighted(), None);
        assert!(scene.active_indices().is_empty());
    }

    #[test]
    fn test_switch_active_band() {
        let mut scene = empty_scene(0);
        scene
            .replace_items(vec![item(1.0, 0.0), item(5.0, 0.0), item(6.0, 0.0)])
            .unwrap();

        scene.set_active_band(2).unwrap();
        assert_eq!(scene.active_band(), 2);
        assert_eq!(scene.active_indices(), vec![1, 2]);
        assert_eq!(scene.highlighted(), Some(1));

        assert_eq!(
            scene.set_active_band(9),
            Err(CullError::BandOutOfRange { band: 9, max: 5 })
        );
    }

    #[test]
    fn test_outermost_band_shown_when_configured() {
        let config = SceneConfig {
            item_count: 0,
            active_band: 5,
            beyond_outermost: BeyondOutermost::Visible,
            ..SceneConfig::default()
        };
        let mut scene = CullingScene::new(&config, &mut EntityGenerator::new(0), [0.0; 3]).unwrap();
        scene.replace_items(vec![item(50.0, 0.0), item(40.0, 0.0)]).unwrap();

        assert_eq!(scene.active_indices(), vec![0, 1]);
        assert_eq!(scene.highlighted(), Some(1));
    }

    #[test]
    fn test_add_item() {
        let mut scene = empty_scene(0);
        scene.replace_items(vec![item(1.5, 0.0)]).unwrap();

        let index = scene.add_item(item(0.5, 0.0)).unwrap();
        assert_eq!(index, 1);
        assert_eq!(scene.active_indices(), vec![0, 1]);
        assert_eq!(scene.highlighted(), Some(1));
    }

    #[test]
    fn test_generated_scene_highlights_closest() {
        let config = SceneConfig {
            item_count: 200,
            active_band: 3,
            ..SceneConfig::default()
        };
        let scene = CullingScene::new(&config, &mut EntityGenerator::new(99), [0.0; 3]).unwrap();

        let shown = scene.active_indices();
        for &i in &shown {
            assert_eq!(scene.group().band_of(i), Some(3));
        }
        match scene.highlighted() {
            Some(h) => {
                let best = distance_squared(scene.items()[h].position(), [0.0; 3]);
                for &i in &shown {
                    assert!(best <= distance_squared(scene.items()[i].position(), [0.0; 3]));
                }
            }
            None => assert!(shown.is_empty()),
        }
    }

    #[test]
    fn test_destroy() {
        let mut scene = empty_scene(0);
        scene.replace_items(vec![item(1.0, 0.0)]).unwrap();
        scene.destroy().unwrap();

        assert_eq!(scene.highlighted(), None);
        assert_eq!(scene.tick(&mut Player::default()), Err(CullError::Disposed));
        assert_eq!(scene.destroy(), Err(CullError::Disposed));
    }
}
