//! Passenger identity, colors, and per-passenger engine state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::grid::GridPos;

/// Engine-assigned passenger identifier, unique within one level session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassengerId(pub u32);

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassengerColor {
    Red,
    Green,
    Blue,
    Purple,
    Cyan,
}

impl PassengerColor {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Cyan => "cyan",
        }
    }
}

impl fmt::Display for PassengerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassengerColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "purple" => Ok(Self::Purple),
            "cyan" => Ok(Self::Cyan),
            _ => Err(()),
        }
    }
}

impl From<PassengerColor> for String {
    fn from(value: PassengerColor) -> Self {
        value.as_str().to_string()
    }
}

/// One passenger's engine-side record.
///
/// `position` is the grid cell the passenger occupies, or last occupied once
/// activated; the grid occupancy map is the authority while on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub id: PassengerId,
    pub color: PassengerColor,
    pub position: GridPos,
    /// Color concealed until the exit row first becomes reachable.
    pub hidden: bool,
    /// Set once the passenger commits to leaving the grid. Single-flight
    /// guard: an activated passenger is never processed a second time.
    pub activated: bool,
    /// Whether the exit row is currently reachable from `position`.
    pub can_move: bool,
}

impl Passenger {
    #[must_use]
    pub const fn new(id: PassengerId, color: PassengerColor, position: GridPos, hidden: bool) -> Self {
        Self {
            id,
            color,
            position,
            hidden,
            activated: false,
            can_move: false,
        }
    }
}
