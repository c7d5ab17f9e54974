//! Nearest-in-band selection and the highlight state machine.

use log::trace;

use crate::entity::{EntityState, distance_squared};
use crate::error::{CullError, CullResult};

/// Index of the candidate closest to `reference`.
///
/// Compares squared distances. Ties go to the first candidate in iteration
/// order. An empty candidate list is an error rather than a silent `0`,
/// since slot 0 is a real entity.
pub fn select_closest(
    candidates: &[usize],
    positions: &[[f32; 3]],
    reference: [f32; 3],
) -> CullResult<usize> {
    select_closest_by(candidates, reference, |index| positions.get(index).copied())
}

/// [`select_closest`] with positions looked up through `position_of`.
///
/// `position_of` returns `None` for indices it does not know, which fails
/// with [`CullError::CandidateOutOfRange`].
pub fn select_closest_by<F>(candidates: &[usize], reference: [f32; 3], position_of: F) -> CullResult<usize>
where
    F: Fn(usize) -> Option<[f32; 3]>,
{
    let mut best: Option<(usize, f32)> = None;

    for &index in candidates {
        let position = position_of(index).ok_or(CullError::CandidateOutOfRange { index })?;
        let d2 = distance_squared(position, reference);

        match best {
            Some((_, best_d2)) if d2 >= best_d2 => {}
            _ => best = Some((index, d2)),
        }
    }

    best.map(|(index, _)| index).ok_or(CullError::EmptySet)
}

/// Tracks which single entity is highlighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightTracker {
    current: Option<usize>,
}

impl HighlightTracker {
    /// Create a tracker with nothing highlighted.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// The highlighted index, if any.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Move the highlight to `next`.
    ///
    /// The previous entity is unhighlighted before `next` is highlighted.
    /// Re-selecting the current entity, or an index past `states`, leaves
    /// every state untouched. Returns true if the highlight moved.
    pub fn select(&mut self, next: usize, states: &mut [EntityState]) -> bool {
        if self.current == Some(next) || next >= states.len() {
            return false;
        }

        self.clear(states);
        states[next].set_highlighted(true);
        self.current = Some(next);
        trace!("highlight moved to {}", next);
        true
    }

    /// Unhighlight the current entity without selecting another.
    pub fn clear(&mut self, states: &mut [EntityState]) {
        if let Some(previous) = self.current.take() {
            if let Some(state) = states.get_mut(previous) {
                state.set_highlighted(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_select_closest() {
        let positions = [[5.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 0.0, 3.0]];
        assert_eq!(select_closest(&[0, 1, 2], &positions, [0.0; 3]), Ok(1));
        assert_eq!(select_closest(&[0, 2], &positions, [0.0; 3]), Ok(2));
        assert_eq!(select_closest(&[0], &positions, [0.0; 3]), Ok(0));
    }

    #[test]
    fn test_empty_set_is_an_error() {
        let positions = [[0.0; 3]];
        assert_eq!(select_closest(&[], &positions, [0.0; 3]), Err(CullError::EmptySet));
    }

    #[test]
    fn test_ties_go_to_first_seen() {
        let positions = [[2.0, 0.0, 0.0], [-2.0, 0.0, 0.0], [0.0, 2.0, 0.0]];
        assert_eq!(select_closest(&[1, 0, 2], &positions, [0.0; 3]), Ok(1));
        assert_eq!(select_closest(&[2, 1, 0], &positions, [0.0; 3]), Ok(2));
        // Same input, same answer
        for _ in 0..10 {
            assert_eq!(select_closest(&[0, 1, 2], &positions, [0.0; 3]), Ok(0));
        }
    }

    #[test]
    fn test_candidate_out_of_range() {
        let positions = [[0.0; 3]];
        assert_eq!(
            select_closest(&[0, 4], &positions, [0.0; 3]),
            Err(CullError::CandidateOutOfRange { index: 4 })
        );
    }

    #[test]
    fn test_highlight_tracker_moves_highlight() {
        let mut states = [EntityState::new(); 3];
        let mut tracker = HighlightTracker::new();

        assert!(tracker.select(1, &mut states));
        assert!(states[1].is_highlighted());

        assert!(tracker.select(2, &mut states));
        assert!(!states[1].is_highlighted());
        assert!(states[2].is_highlighted());
        assert_eq!(tracker.current(), Some(2));

        // Unchanged selection is a no-op
        assert!(!tracker.select(2, &mut states));
        assert!(states[2].is_highlighted());

        tracker.clear(&mut states);
        assert_eq!(tracker.current(), None);
        assert!(states.iter().all(|s| !s.is_highlighted()));
    }

    #[test]
    fn test_highlight_tracker_ignores_unknown_index() {
        let mut states = [EntityState::new(); 2];
        let mut tracker = HighlightTracker::new();
        assert!(tracker.select(0, &mut states));

        assert!(!tracker.select(9, &mut states));
        assert_eq!(tracker.current(), Some(0));
        assert!(states[0].is_highlighted());
        assert!(!states[1].is_highlighted());
    }

    proptest! {
        /// The selected candidate is at least as close as every other one
        #[test]
        fn prop_selected_is_closest(
            positions in prop::collection::vec(
                (-50.0f32..50.0, -50.0f32..50.0, -50.0f32..50.0),
                1..30,
            ),
            reference in (-50.0f32..50.0, -50.0f32..50.0, -50.0f32..50.0),
        ) {
            let positions: Vec<[f32; 3]> = positions.into_iter().map(|(x, y, z)| [x, y, z]).collect();
            let reference = [reference.0, reference.1, reference.2];
            let candidates: Vec<usize> = (0..positions.len()).collect();

            let chosen = select_closest(&candidates, &positions, reference).unwrap();
            let best = distance_squared(positions[chosen], reference);
            for (i, &p) in positions.iter().enumerate() {
                let d = distance_squared(p, reference);
                prop_assert!(best <= d);
                if d == best {
                    // First-seen tie break
                    prop_assert!(chosen <= i);
                }
            }
        }
    }
}
