//! Fixed-capacity bench slot pool with lowest-index-first reservation.

use serde::{Deserialize, Serialize};

use crate::passenger::PassengerId;

/// One bench slot's occupant. A slot is reserved at assignment time and
/// settles once the passenger's journey to the bench completes; both states
/// count against capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchOccupant {
    pub passenger: PassengerId,
    pub settled: bool,
}

/// Ordered pool of bench slots. Assignment always picks the lowest-index
/// empty slot; ties cannot occur since slots are indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bench {
    slots: Vec<Option<BenchOccupant>>,
}

impl Bench {
    #[must_use]
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
        }
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Reserve the lowest-index empty slot for `passenger`, returning the
    /// slot index, or `None` when every slot is taken.
    pub fn reserve(&mut self, passenger: PassengerId) -> Option<usize> {
        let slot = self.slots.iter().position(Option::is_none)?;
        self.slots[slot] = Some(BenchOccupant {
            passenger,
            settled: false,
        });
        Some(slot)
    }

    /// Confirm that the reserved passenger has physically arrived.
    ///
    /// # Panics
    ///
    /// Panics when the slot does not hold a reservation for `passenger`;
    /// that would mean an arrival callback for a journey the bench never
    /// accepted, which corrupts lose-condition evaluation.
    pub fn settle(&mut self, slot: usize, passenger: PassengerId) {
        match self.slots.get_mut(slot) {
            Some(Some(occupant)) if occupant.passenger == passenger => {
                occupant.settled = true;
            }
            _ => panic!("bench slot {slot} holds no reservation for {passenger}"),
        }
    }

    /// Free a slot, returning the passenger that held it.
    pub fn release(&mut self, slot: usize) -> Option<PassengerId> {
        self.slots
            .get_mut(slot)
            .and_then(Option::take)
            .map(|occupant| occupant.passenger)
    }

    /// All occupants (reserved and settled) in ascending slot order.
    pub fn occupants(&self) -> impl Iterator<Item = (usize, BenchOccupant)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, occ)| occ.map(|occ| (slot, occ)))
    }

    /// Occupants whose journey to the bench has completed, in ascending slot
    /// order. Re-evaluation scans only these; mid-flight journeys cannot be
    /// redirected.
    pub fn settled_occupants(&self) -> impl Iterator<Item = (usize, PassengerId)> + '_ {
        self.occupants()
            .filter(|(_, occ)| occ.settled)
            .map(|(slot, occ)| (slot, occ.passenger))
    }
}
