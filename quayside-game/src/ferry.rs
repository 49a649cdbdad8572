//! Ferries and the strict arrival-order docking queue.

use serde::{Deserialize, Serialize};

use crate::passenger::PassengerColor;

/// One ferry in the arrival sequence.
///
/// Capacity is reserved eagerly: `assigned` is incremented the moment a
/// passenger commits to boarding, so concurrent activations can never
/// over-subscribe the ferry. `boarded` counts physical arrivals only, and the
/// ferry departs once `boarded` reaches capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ferry {
    pub color: PassengerColor,
    pub capacity: u32,
    pub arrival_order: usize,
    assigned: u32,
    boarded: u32,
}

impl Ferry {
    #[must_use]
    pub const fn new(color: PassengerColor, capacity: u32, arrival_order: usize) -> Self {
        Self {
            color,
            capacity,
            arrival_order,
            assigned: 0,
            boarded: 0,
        }
    }

    #[must_use]
    pub const fn assigned(&self) -> u32 {
        self.assigned
    }

    #[must_use]
    pub const fn boarded(&self) -> u32 {
        self.boarded
    }

    /// Full once every capacity slot is promised, not once boarded.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.assigned >= self.capacity
    }

    /// Reserve one boarding slot.
    ///
    /// # Panics
    ///
    /// Panics when the ferry is already full; callers must check `is_full`
    /// first. Over-assignment would corrupt departure accounting.
    pub fn assign(&mut self) {
        assert!(
            self.assigned < self.capacity,
            "ferry {} assigned past capacity {}",
            self.arrival_order,
            self.capacity
        );
        self.assigned += 1;
    }

    /// Record a physical boarding. Returns true when the ferry is now ready
    /// to depart.
    ///
    /// # Panics
    ///
    /// Panics on a boarding without a matching reservation; arrivals can only
    /// come from journeys the engine itself dispatched.
    pub fn register_boarding(&mut self) -> bool {
        assert!(
            self.boarded < self.assigned,
            "ferry {} boarding without reservation",
            self.arrival_order
        );
        self.boarded += 1;
        self.boarded == self.capacity
    }
}

/// Ordered ferry sequence with at most one docked ferry.
///
/// Ferries dock strictly in `arrival_order`; ferry `k + 1` never docks before
/// ferry `k` has departed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FerryQueue {
    ferries: Vec<Ferry>,
    next: usize,
    docked: Option<usize>,
}

impl FerryQueue {
    #[must_use]
    pub fn new(ferries: Vec<Ferry>) -> Self {
        Self {
            ferries,
            next: 0,
            docked: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ferries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ferries.is_empty()
    }

    #[must_use]
    pub fn docked(&self) -> Option<&Ferry> {
        self.docked.map(|i| &self.ferries[i])
    }

    pub fn docked_mut(&mut self) -> Option<&mut Ferry> {
        self.docked.map(|i| &mut self.ferries[i])
    }

    /// All ferries have docked and departed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.docked.is_none() && self.next >= self.ferries.len()
    }

    /// Dock the next ferry in arrival order, returning it, or `None` when the
    /// sequence is exhausted.
    ///
    /// # Panics
    ///
    /// Panics when a ferry is still docked; in-order docking requires the
    /// berth to be empty.
    pub fn dock_next(&mut self) -> Option<&Ferry> {
        assert!(self.docked.is_none(), "docking with the berth occupied");
        if self.next >= self.ferries.len() {
            return None;
        }
        self.docked = Some(self.next);
        self.next += 1;
        self.docked()
    }

    /// Clear the berth, returning a copy of the departed ferry.
    ///
    /// # Panics
    ///
    /// Panics when no ferry is docked or the docked ferry has not boarded to
    /// capacity; every reservation must become an arrival before departure.
    pub fn depart_docked(&mut self) -> Ferry {
        let index = self.docked.expect("departure with an empty berth");
        let ferry = &self.ferries[index];
        assert!(
            ferry.boarded() == ferry.capacity,
            "ferry {} departing below capacity",
            ferry.arrival_order
        );
        let departed = ferry.clone();
        self.docked = None;
        departed
    }
}
