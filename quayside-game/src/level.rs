//! Level data input and load-time validation.
//!
//! Levels are plain JSON documents. Malformed data is a load failure; the
//! session never starts from an invalid level.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::constants::{DEFAULT_BENCH_SLOTS, DEFAULT_FERRY_CAPACITY, DEFAULT_TIME_LIMIT};
use crate::grid::{Direction, GridPos};
use crate::passenger::PassengerColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerSpawn {
    pub position: GridPos,
    pub color: PassengerColor,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelSpawn {
    pub position: GridPos,
    pub exit_direction: Direction,
    #[serde(default)]
    pub pending_colors: Vec<PassengerColor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FerrySpec {
    pub color: PassengerColor,
    #[serde(default = "FerrySpec::default_capacity")]
    pub capacity: u32,
}

impl FerrySpec {
    const fn default_capacity() -> u32 {
        DEFAULT_FERRY_CAPACITY
    }
}

/// Complete description of one level. Ferry order in `ferries` is arrival
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    #[serde(default)]
    pub level_number: u32,
    pub grid_size: GridSize,
    #[serde(default)]
    pub invalid_cells: Vec<GridPos>,
    #[serde(default)]
    pub passengers: Vec<PassengerSpawn>,
    #[serde(default)]
    pub tunnels: Vec<TunnelSpawn>,
    pub ferries: Vec<FerrySpec>,
    #[serde(default = "LevelData::default_time_limit")]
    pub time_limit: f32,
    #[serde(default = "LevelData::default_bench_slots")]
    pub bench_slots: usize,
}

/// Load-time validation failures.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("grid size {width}x{height} is not positive")]
    EmptyGrid { width: i32, height: i32 },
    #[error("time limit {value} must be positive")]
    NonPositiveTimeLimit { value: f32 },
    #[error("bench must have at least one slot")]
    NoBenchSlots,
    #[error("level has no ferries")]
    NoFerries,
    #[error("ferry {index} has zero capacity")]
    ZeroCapacityFerry { index: usize },
    #[error("{what} at {position} is outside the grid")]
    OutOfBounds {
        what: &'static str,
        position: GridPos,
    },
    #[error("{what} at {position} sits on an invalid cell")]
    OnInvalidCell {
        what: &'static str,
        position: GridPos,
    },
    #[error("two objects occupy {position}")]
    DuplicateCell { position: GridPos },
    #[error("tunnel at {position} exits onto an unusable cell")]
    TunnelExitBlocked { position: GridPos },
}

impl LevelData {
    const fn default_time_limit() -> f32 {
        DEFAULT_TIME_LIMIT
    }

    const fn default_bench_slots() -> usize {
        DEFAULT_BENCH_SLOTS
    }

    /// Parse and validate a JSON level document.
    ///
    /// # Errors
    ///
    /// Returns `LevelError` when the JSON is malformed or the level violates
    /// a structural invariant.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    const fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.grid_size.width && pos.y >= 0 && pos.y < self.grid_size.height
    }

    /// Check every structural invariant the session relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: non-positive dimensions, time
    /// limit, or capacities; out-of-bounds, invalid-cell, or duplicate
    /// placements; tunnels whose exit cell can never accept a passenger.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.grid_size.width <= 0 || self.grid_size.height <= 0 {
            return Err(LevelError::EmptyGrid {
                width: self.grid_size.width,
                height: self.grid_size.height,
            });
        }
        if self.time_limit <= 0.0 {
            return Err(LevelError::NonPositiveTimeLimit {
                value: self.time_limit,
            });
        }
        if self.bench_slots == 0 {
            return Err(LevelError::NoBenchSlots);
        }
        if self.ferries.is_empty() {
            return Err(LevelError::NoFerries);
        }
        if let Some(index) = self.ferries.iter().position(|f| f.capacity == 0) {
            return Err(LevelError::ZeroCapacityFerry { index });
        }

        let invalid: HashSet<GridPos> = self.invalid_cells.iter().copied().collect();
        for &pos in &self.invalid_cells {
            if !self.in_bounds(pos) {
                return Err(LevelError::OutOfBounds {
                    what: "invalid cell",
                    position: pos,
                });
            }
        }

        let mut taken = HashSet::new();
        let mut claim = |what: &'static str, pos: GridPos| -> Result<(), LevelError> {
            if !self.in_bounds(pos) {
                return Err(LevelError::OutOfBounds {
                    what,
                    position: pos,
                });
            }
            if invalid.contains(&pos) {
                return Err(LevelError::OnInvalidCell {
                    what,
                    position: pos,
                });
            }
            if !taken.insert(pos) {
                return Err(LevelError::DuplicateCell { position: pos });
            }
            Ok(())
        };

        for passenger in &self.passengers {
            claim("passenger", passenger.position)?;
        }
        for tunnel in &self.tunnels {
            claim("tunnel", tunnel.position)?;
        }
        for tunnel in &self.tunnels {
            // An exit off the grid, onto a hole, or onto another tunnel mouth
            // can never clear; an exit onto a passenger cell is fine.
            let exit = tunnel.exit_direction.step(tunnel.position);
            let blocked_forever = !self.in_bounds(exit)
                || invalid.contains(&exit)
                || self.tunnels.iter().any(|t| t.position == exit);
            if blocked_forever {
                return Err(LevelError::TunnelExitBlocked {
                    position: tunnel.position,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_level() -> LevelData {
        LevelData {
            level_number: 1,
            grid_size: GridSize {
                width: 3,
                height: 3,
            },
            invalid_cells: vec![],
            passengers: vec![PassengerSpawn {
                position: GridPos::new(0, 0),
                color: PassengerColor::Red,
                hidden: false,
            }],
            tunnels: vec![],
            ferries: vec![FerrySpec {
                color: PassengerColor::Red,
                capacity: 1,
            }],
            time_limit: 30.0,
            bench_slots: 2,
        }
    }

    #[test]
    fn minimal_level_validates() {
        minimal_level().validate().expect("valid level");
    }

    #[test]
    fn json_defaults_fill_optional_fields() {
        let json = r#"{
            "grid_size": { "width": 4, "height": 3 },
            "passengers": [
                { "position": { "x": 1, "y": 1 }, "color": "blue" }
            ],
            "ferries": [ { "color": "blue" } ]
        }"#;
        let level = LevelData::from_json(json).expect("parse and validate");
        assert_eq!(level.ferries[0].capacity, DEFAULT_FERRY_CAPACITY);
        assert!((level.time_limit - DEFAULT_TIME_LIMIT).abs() < f32::EPSILON);
        assert_eq!(level.bench_slots, DEFAULT_BENCH_SLOTS);
        assert!(!level.passengers[0].hidden);
    }

    #[test]
    fn rejects_passenger_on_invalid_cell() {
        let mut level = minimal_level();
        level.invalid_cells = vec![GridPos::new(0, 0)];
        assert!(matches!(
            level.validate(),
            Err(LevelError::OnInvalidCell { what: "passenger", .. })
        ));
    }

    #[test]
    fn rejects_duplicate_occupants() {
        let mut level = minimal_level();
        level.passengers.push(PassengerSpawn {
            position: GridPos::new(0, 0),
            color: PassengerColor::Blue,
            hidden: false,
        });
        assert!(matches!(
            level.validate(),
            Err(LevelError::DuplicateCell { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_time_limit_and_capacity() {
        let mut level = minimal_level();
        level.time_limit = 0.0;
        assert!(matches!(
            level.validate(),
            Err(LevelError::NonPositiveTimeLimit { .. })
        ));

        let mut level = minimal_level();
        level.ferries[0].capacity = 0;
        assert!(matches!(
            level.validate(),
            Err(LevelError::ZeroCapacityFerry { index: 0 })
        ));

        let mut level = minimal_level();
        level.ferries.clear();
        assert!(matches!(level.validate(), Err(LevelError::NoFerries)));
    }

    #[test]
    fn rejects_tunnel_exiting_off_grid_or_onto_a_hole() {
        let mut level = minimal_level();
        level.tunnels = vec![TunnelSpawn {
            position: GridPos::new(2, 0),
            exit_direction: Direction::East,
            pending_colors: vec![PassengerColor::Red],
        }];
        assert!(matches!(
            level.validate(),
            Err(LevelError::TunnelExitBlocked { .. })
        ));

        let mut level = minimal_level();
        level.invalid_cells = vec![GridPos::new(2, 2)];
        level.tunnels = vec![TunnelSpawn {
            position: GridPos::new(2, 1),
            exit_direction: Direction::North,
            pending_colors: vec![PassengerColor::Red],
        }];
        assert!(matches!(
            level.validate(),
            Err(LevelError::TunnelExitBlocked { .. })
        ));
    }

    #[test]
    fn tunnel_may_exit_onto_an_initial_passenger() {
        let mut level = minimal_level();
        level.tunnels = vec![TunnelSpawn {
            position: GridPos::new(0, 1),
            exit_direction: Direction::South,
            pending_colors: vec![PassengerColor::Red],
        }];
        // Exit cell (0, 0) holds a passenger that can later move away.
        level.validate().expect("occupied exit clears later");
    }
}
