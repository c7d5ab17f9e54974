//! Band membership change notifications.

use serde::{Deserialize, Serialize};

/// A single entity moved between bands or changed visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandChangeEvent {
    /// Slot of the entity in the dense volume array.
    pub index: usize,
    /// Band before the update.
    pub previous_band: usize,
    /// Band after the update.
    pub current_band: usize,
    /// Visibility before the update.
    pub was_visible: bool,
    /// Visibility after the update.
    pub is_visible: bool,
}

impl BandChangeEvent {
    /// The entity crossed from culled to visible.
    #[inline]
    pub fn has_become_visible(&self) -> bool {
        !self.was_visible && self.is_visible
    }

    /// The entity crossed from visible to culled.
    #[inline]
    pub fn has_become_invisible(&self) -> bool {
        self.was_visible && !self.is_visible
    }
}

/// Receives band changes as they are computed.
pub trait BandListener {
    fn on_band_changed(&mut self, event: &BandChangeEvent);
}

impl<F> BandListener for F
where
    F: FnMut(&BandChangeEvent),
{
    fn on_band_changed(&mut self, event: &BandChangeEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_transitions() {
        let mut event = BandChangeEvent {
            index: 0,
            previous_band: 5,
            current_band: 2,
            was_visible: false,
            is_visible: true,
        };
        assert!(event.has_become_visible());
        assert!(!event.has_become_invisible());

        event.was_visible = true;
        assert!(!event.has_become_visible());
    }

    #[test]
    fn test_closure_listener() {
        let mut seen = Vec::new();
        {
            let mut listener = |event: &BandChangeEvent| seen.push(event.index);
            let event = BandChangeEvent {
                index: 3,
                previous_band: 1,
                current_band: 0,
                was_visible: true,
                is_visible: true,
            };
            listener.on_band_changed(&event);
        }
        assert_eq!(seen, vec![3]);
    }
}
