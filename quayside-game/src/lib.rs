//! Quayside Game Engine
//!
//! Platform-agnostic core game logic for the Quayside passenger-routing
//! puzzle. This crate provides all game mechanics without UI or
//! platform-specific dependencies: the host owns rendering, input, and
//! animation, and talks to the engine through taps, timer ticks, and arrival
//! callbacks.

pub mod assign;
pub mod bench;
pub mod constants;
pub mod event;
pub mod ferry;
pub mod grid;
pub mod level;
pub mod passenger;
pub mod session;
pub mod tunnel;

// Re-export commonly used types
pub use assign::try_assign;
pub use bench::{Bench, BenchOccupant};
pub use event::{Destination, EngineEvent, FailCause, SessionState};
pub use ferry::{Ferry, FerryQueue};
pub use grid::{CellOccupant, Direction, GridModel, GridPos};
pub use level::{FerrySpec, GridSize, LevelData, LevelError, PassengerSpawn, TunnelSpawn};
pub use passenger::{Passenger, PassengerColor, PassengerId};
pub use session::LevelSession;
pub use tunnel::{PendingColors, Tunnel};

/// Trait for abstracting level loading operations
/// Platform-specific implementations should provide this
pub trait LevelLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the data for one level
    ///
    /// # Errors
    ///
    /// Returns an error if the level data cannot be loaded.
    fn load_level(&self, level_number: u32) -> Result<LevelData, Self::Error>;

    /// Number of levels available from this source
    fn level_count(&self) -> u32;
}

/// Trait for abstracting progress persistence
/// Platform-specific implementations should provide this
pub trait ProgressStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Highest level the player has completed, or `None` for a fresh profile
    ///
    /// # Errors
    ///
    /// Returns an error if the stored progress cannot be read.
    fn highest_completed(&self) -> Result<Option<u32>, Self::Error>;

    /// Record a completed level
    ///
    /// # Errors
    ///
    /// Returns an error if progress cannot be persisted.
    fn record_completed(&self, level_number: u32) -> Result<(), Self::Error>;
}

/// Main game engine for managing level sessions and progress
pub struct GameEngine<L, P>
where
    L: LevelLoader,
    P: ProgressStore,
{
    loader: L,
    progress: P,
}

impl<L, P> GameEngine<L, P>
where
    L: LevelLoader,
    P: ProgressStore,
{
    /// Create a new game engine with the provided loader and progress store
    pub const fn new(loader: L, progress: P) -> Self {
        Self { loader, progress }
    }

    /// The next level the player should attempt. Wraps back to the first
    /// level after the last one is completed.
    ///
    /// # Errors
    ///
    /// Returns an error if stored progress cannot be read.
    pub fn next_level(&self) -> Result<u32, P::Error> {
        let completed = self.progress.highest_completed()?.unwrap_or(0);
        let count = self.loader.level_count().max(1);
        Ok(completed % count + 1)
    }

    /// Load a level and build a fresh session for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the level cannot be loaded or fails validation.
    pub fn start_level(&self, level_number: u32) -> Result<LevelSession, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let data = self.loader.load_level(level_number).map_err(Into::into)?;
        Ok(LevelSession::new(&data)?)
    }

    /// Record a won session's level as completed.
    ///
    /// # Errors
    ///
    /// Returns an error if progress cannot be persisted.
    pub fn complete_level(&self, session: &LevelSession) -> Result<(), P::Error> {
        debug_assert_eq!(session.state(), SessionState::Won);
        self.progress.record_completed(session.level_number())
    }
}
