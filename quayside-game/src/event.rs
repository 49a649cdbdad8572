//! Outbound events and commands emitted by the session.
//!
//! The engine pushes everything the outside world needs to react to into one
//! ordered queue: movement and spawn commands for the animation collaborator,
//! plus notifications for HUD, audio, and other listeners. Draining is
//! optional for notifications, but every movement or spawn command expects
//! exactly one `notify_arrived` callback once the motion settles.

use serde::{Deserialize, Serialize};

use crate::grid::GridPos;
use crate::passenger::{PassengerColor, PassengerId};

/// Session lifecycle states. `Won` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Initial state; nothing moves until the first ferry docks.
    #[default]
    Paused,
    Playing,
    Won,
    Failed,
}

impl SessionState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Failed)
    }
}

/// Why a session failed. Presented identically to the player; kept distinct
/// for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailCause {
    /// Bench full and the docked ferry cannot take anyone waiting.
    BenchLocked,
    TimedOut,
}

/// Where an activated passenger is headed. Fixed at assignment time; journeys
/// are never cancelled or redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Bench { slot: usize },
    Ferry { arrival_order: usize },
}

/// One entry in the session's ordered outbound queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineEvent {
    SessionStateChanged {
        state: SessionState,
    },
    TimerTick {
        remaining: f32,
    },
    FerryDocked {
        arrival_order: usize,
        color: PassengerColor,
        capacity: u32,
    },
    /// A passenger physically boarded the docked ferry.
    FerryBoarded {
        arrival_order: usize,
        boarded: u32,
        capacity: u32,
    },
    FerryDeparted {
        arrival_order: usize,
        color: PassengerColor,
    },
    /// Command: animate the passenger along `path` and call back
    /// `notify_arrived` exactly once. An empty path means the passenger moves
    /// from the bench, not across the grid.
    MovePassenger {
        id: PassengerId,
        path: Vec<GridPos>,
        destination: Destination,
    },
    /// Command: animate a tunnel injection from the mouth to the exit cell,
    /// then call back `notify_arrived` exactly once.
    SpawnPassenger {
        id: PassengerId,
        color: PassengerColor,
        tunnel: GridPos,
        exit: GridPos,
    },
    /// A hidden passenger's color became visible.
    PassengerRevealed {
        id: PassengerId,
        color: PassengerColor,
    },
    /// The exit row became reachable, or stopped being reachable, from the
    /// passenger's cell.
    PassengerMobilityChanged {
        id: PassengerId,
        can_move: bool,
    },
    TunnelCountChanged {
        tunnel: GridPos,
        remaining: usize,
    },
}
