//! Destination assignment: docked ferry first, bench fallback.

use log::debug;

use crate::bench::Bench;
use crate::event::Destination;
use crate::ferry::FerryQueue;
use crate::passenger::{PassengerColor, PassengerId};

/// Decide where an activated passenger goes and reserve the capacity
/// atomically with the decision.
///
/// Order matters: a ferry reservation or bench slot is taken *before* the
/// caller vacates the grid cell, so a failed assignment leaves the passenger
/// untouched and tappable later.
pub fn try_assign(
    ferries: &mut FerryQueue,
    bench: &mut Bench,
    passenger: PassengerId,
    color: PassengerColor,
) -> Option<Destination> {
    if let Some(ferry) = ferries.docked_mut() {
        if ferry.color == color && !ferry.is_full() {
            ferry.assign();
            return Some(Destination::Ferry {
                arrival_order: ferry.arrival_order,
            });
        }
    }
    match bench.reserve(passenger) {
        Some(slot) => Some(Destination::Bench { slot }),
        None => {
            debug!("no destination for {passenger} ({color}): ferry mismatch and bench full");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ferry::Ferry;

    fn docked_queue(color: PassengerColor, capacity: u32) -> FerryQueue {
        let mut queue = FerryQueue::new(vec![Ferry::new(color, capacity, 0)]);
        queue.dock_next();
        queue
    }

    #[test]
    fn matching_ferry_wins_over_bench() {
        let mut ferries = docked_queue(PassengerColor::Red, 2);
        let mut bench = Bench::new(2);

        let dest = try_assign(&mut ferries, &mut bench, PassengerId(1), PassengerColor::Red);
        assert_eq!(dest, Some(Destination::Ferry { arrival_order: 0 }));
        assert_eq!(ferries.docked().expect("docked").assigned(), 1);
        assert!(bench.is_empty());
    }

    #[test]
    fn full_ferry_falls_through_to_bench() {
        let mut ferries = docked_queue(PassengerColor::Red, 1);
        let mut bench = Bench::new(2);

        try_assign(&mut ferries, &mut bench, PassengerId(1), PassengerColor::Red);
        let dest = try_assign(&mut ferries, &mut bench, PassengerId(2), PassengerColor::Red);
        assert_eq!(dest, Some(Destination::Bench { slot: 0 }));
        assert_eq!(ferries.docked().expect("docked").assigned(), 1);
    }

    #[test]
    fn color_mismatch_takes_lowest_bench_slot() {
        let mut ferries = docked_queue(PassengerColor::Blue, 3);
        let mut bench = Bench::new(3);

        let first = try_assign(&mut ferries, &mut bench, PassengerId(1), PassengerColor::Red);
        let second = try_assign(&mut ferries, &mut bench, PassengerId(2), PassengerColor::Green);
        assert_eq!(first, Some(Destination::Bench { slot: 0 }));
        assert_eq!(second, Some(Destination::Bench { slot: 1 }));
        assert_eq!(ferries.docked().expect("docked").assigned(), 0);
    }

    #[test]
    fn no_ferry_and_full_bench_yields_none() {
        let mut ferries = FerryQueue::new(vec![Ferry::new(PassengerColor::Red, 1, 0)]);
        let mut bench = Bench::new(1);
        bench.reserve(PassengerId(9));

        let dest = try_assign(&mut ferries, &mut bench, PassengerId(1), PassengerColor::Red);
        assert_eq!(dest, None);
    }

    #[test]
    fn repeated_assignment_respects_capacity_then_bench_order() {
        let mut ferries = docked_queue(PassengerColor::Cyan, 2);
        let mut bench = Bench::new(2);

        let destinations: Vec<_> = (0..4)
            .map(|i| try_assign(&mut ferries, &mut bench, PassengerId(i), PassengerColor::Cyan))
            .collect();
        assert_eq!(
            destinations,
            vec![
                Some(Destination::Ferry { arrival_order: 0 }),
                Some(Destination::Ferry { arrival_order: 0 }),
                Some(Destination::Bench { slot: 0 }),
                Some(Destination::Bench { slot: 1 }),
            ]
        );
        assert_eq!(ferries.docked().expect("docked").assigned(), 2);
    }
}
