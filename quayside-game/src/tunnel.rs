//! Tunnel feeders injecting queued passengers onto the grid.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::grid::{Direction, GridModel, GridPos};
use crate::passenger::{PassengerColor, PassengerId};

/// Pending colors stored inline for typical tunnel depths.
pub type PendingColors = SmallVec<[PassengerColor; 8]>;

/// A bounded passenger source. The mouth blocks its own grid cell; each
/// injection places a new passenger on the adjacent exit cell, and only one
/// injection may be in flight per tunnel at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tunnel {
    position: GridPos,
    exit_direction: Direction,
    pending: PendingColors,
    spawning: Option<PassengerId>,
}

impl Tunnel {
    #[must_use]
    pub fn new(position: GridPos, exit_direction: Direction, pending: PendingColors) -> Self {
        Self {
            position,
            exit_direction,
            pending,
            spawning: None,
        }
    }

    #[must_use]
    pub const fn position(&self) -> GridPos {
        self.position
    }

    #[must_use]
    pub const fn exit_direction(&self) -> Direction {
        self.exit_direction
    }

    /// The fixed cell injected passengers appear on.
    #[must_use]
    pub const fn exit_position(&self) -> GridPos {
        self.exit_direction.step(self.position)
    }

    /// Colors still waiting inside the tunnel.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub const fn is_spawning(&self) -> bool {
        self.spawning.is_some()
    }

    /// Whether an injection can start right now: a color is pending, no
    /// injection is outstanding, and the exit cell is walkable.
    #[must_use]
    pub fn can_spawn(&self, grid: &GridModel) -> bool {
        !self.pending.is_empty() && self.spawning.is_none() && grid.is_walkable(self.exit_position())
    }

    /// Dequeue the next pending color and mark `id` as the in-flight
    /// injection.
    ///
    /// # Panics
    ///
    /// Panics when no color is pending or another injection is outstanding;
    /// callers gate on `can_spawn`.
    pub fn begin_spawn(&mut self, id: PassengerId) -> PassengerColor {
        assert!(
            self.spawning.is_none(),
            "tunnel at {} already has an injection in flight",
            self.position
        );
        assert!(!self.pending.is_empty(), "tunnel at {} is empty", self.position);
        self.spawning = Some(id);
        self.pending.remove(0)
    }

    /// Mark the in-flight injection as settled.
    ///
    /// # Panics
    ///
    /// Panics when `id` is not the outstanding injection.
    pub fn finish_spawn(&mut self, id: PassengerId) {
        assert_eq!(
            self.spawning,
            Some(id),
            "tunnel at {} has no injection in flight for {id}",
            self.position
        );
        self.spawning = None;
    }
}
