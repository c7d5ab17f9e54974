//! Moving reference point.

/// Units per second at full axis input.
pub const PLAYER_SPEED: f32 = 25.0;

/// Moves that would end this far from the origin or farther are rejected.
pub const CLAMP_DISTANCE: f32 = 30.0;

/// Supplies the reference point once per tick.
pub trait ReferenceSource {
    /// Current position.
    fn position(&self) -> [f32; 3];

    /// Whether the position changed since the last call. Clears the flag.
    fn take_moved(&mut self) -> bool;
}

/// A reference point driven by two-axis input on the XZ plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    position: [f32; 3],
    moved: bool,
}

impl Player {
    /// Create a player at `position`. The first tick always sees it as moved.
    pub fn new(position: [f32; 3]) -> Self {
        Self {
            position,
            moved: true,
        }
    }

    /// Apply one frame of input.
    ///
    /// `horizontal` and `vertical` are axis values in `[-1, 1]`, `dt` the
    /// frame time in seconds. Returns false if the move was clamped away.
    pub fn update(&mut self, horizontal: f32, vertical: f32, dt: f32) -> bool {
        let step = PLAYER_SPEED * dt;
        let next = [
            self.position[0] + horizontal.clamp(-1.0, 1.0) * step,
            self.position[1],
            self.position[2] + vertical.clamp(-1.0, 1.0) * step,
        ];

        let distance = (next[0] * next[0] + next[1] * next[1] + next[2] * next[2]).sqrt();
        if distance >= CLAMP_DISTANCE {
            return false;
        }

        if next != self.position {
            self.position = next;
            self.moved = true;
        }
        true
    }

    /// Place the player directly, bypassing the clamp.
    pub fn teleport(&mut self, position: [f32; 3]) {
        if position != self.position {
            self.position = position;
            self.moved = true;
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new([0.0; 3])
    }
}

impl ReferenceSource for Player {
    fn position(&self) -> [f32; 3] {
        self.position
    }

    fn take_moved(&mut self) -> bool {
        std::mem::take(&mut self.moved)
    }
}
