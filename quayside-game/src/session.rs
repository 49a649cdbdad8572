//! Top-level level session: state machine, timer, and event wiring.
//!
//! The session owns the grid, bench, ferry queue, and tunnels, and mutates
//! them from a single logical event stream: taps, arrival callbacks, and
//! timer ticks. Logical commits (grid removal, capacity reservation) happen
//! synchronously inside each call; visual motion is the host's job and
//! reports back through [`LevelSession::notify_arrived`].

use log::{debug, info};
use std::collections::{HashMap, VecDeque};

use crate::assign;
use crate::bench::Bench;
use crate::event::{Destination, EngineEvent, FailCause, SessionState};
use crate::ferry::{Ferry, FerryQueue};
use crate::grid::{GridModel, GridPos};
use crate::level::{LevelData, LevelError};
use crate::passenger::{Passenger, PassengerId};
use crate::tunnel::Tunnel;

/// An outstanding journey awaiting its arrival callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Journey {
    ToBench { slot: usize },
    ToFerry,
    FromTunnel { tunnel: usize },
}

/// One level's complete simulation state.
#[derive(Debug, Clone)]
pub struct LevelSession {
    level_number: u32,
    state: SessionState,
    fail_cause: Option<FailCause>,
    time_remaining: f32,
    grid: GridModel,
    bench: Bench,
    ferries: FerryQueue,
    tunnels: Vec<Tunnel>,
    passengers: HashMap<PassengerId, Passenger>,
    in_flight: HashMap<PassengerId, Journey>,
    next_passenger_id: u32,
    events: VecDeque<EngineEvent>,
}

impl LevelSession {
    /// Build a session from validated level data.
    ///
    /// # Errors
    ///
    /// Returns `LevelError` when the level data violates a load-time
    /// invariant; the session is never constructed from a bad level.
    pub fn new(level: &LevelData) -> Result<Self, LevelError> {
        level.validate()?;

        let invalid = level.invalid_cells.iter().copied().collect();
        let mut grid = GridModel::new(level.grid_size.width, level.grid_size.height, invalid);

        let mut tunnels = Vec::with_capacity(level.tunnels.len());
        for spawn in &level.tunnels {
            let placed = grid.place_tunnel_mouth(spawn.position);
            debug_assert!(placed, "validated tunnel mouth must be placeable");
            tunnels.push(Tunnel::new(
                spawn.position,
                spawn.exit_direction,
                spawn.pending_colors.iter().copied().collect(),
            ));
        }

        let mut passengers = HashMap::new();
        let mut next_passenger_id = 0;
        for spawn in &level.passengers {
            let id = PassengerId(next_passenger_id);
            next_passenger_id += 1;
            let placed = grid.place_passenger(spawn.position, id);
            debug_assert!(placed, "validated passenger must be placeable");
            passengers.insert(
                id,
                Passenger::new(id, spawn.color, spawn.position, spawn.hidden),
            );
        }

        let ferries = FerryQueue::new(
            level
                .ferries
                .iter()
                .enumerate()
                .map(|(order, spec)| Ferry::new(spec.color, spec.capacity, order))
                .collect(),
        );

        let mut session = Self {
            level_number: level.level_number,
            state: SessionState::Paused,
            fail_cause: None,
            time_remaining: level.time_limit,
            grid,
            bench: Bench::new(level.bench_slots),
            ferries,
            tunnels,
            passengers,
            in_flight: HashMap::new(),
            next_passenger_id,
            events: VecDeque::new(),
        };

        // Seed mobility and reveal flags without emitting events; nothing is
        // listening before the session starts.
        for (pos, id) in session.grid.passenger_cells() {
            let can_move = session.grid.reaches_exit_row(pos);
            let passenger = session.passenger_record_mut(id);
            passenger.can_move = can_move;
            if can_move {
                passenger.hidden = false;
            }
        }
        Ok(session)
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn fail_cause(&self) -> Option<FailCause> {
        self.fail_cause
    }

    #[must_use]
    pub const fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    #[must_use]
    pub const fn level_number(&self) -> u32 {
        self.level_number
    }

    #[must_use]
    pub const fn grid(&self) -> &GridModel {
        &self.grid
    }

    #[must_use]
    pub const fn bench(&self) -> &Bench {
        &self.bench
    }

    #[must_use]
    pub const fn ferries(&self) -> &FerryQueue {
        &self.ferries
    }

    #[must_use]
    pub fn tunnels(&self) -> &[Tunnel] {
        &self.tunnels
    }

    #[must_use]
    pub fn passenger(&self, id: PassengerId) -> Option<&Passenger> {
        self.passengers.get(&id)
    }

    /// Drain the ordered outbound queue. Listeners are optional, but every
    /// drained movement or spawn command expects one `notify_arrived`.
    pub fn drain_events(&mut self) -> impl Iterator<Item = EngineEvent> + '_ {
        self.events.drain(..)
    }

    /// Dock the first ferry and start play. The timer runs only from here.
    pub fn start(&mut self) {
        if self.state != SessionState::Paused {
            debug!("start ignored in state {:?}", self.state);
            return;
        }
        self.dock_and_announce();
        self.set_state(SessionState::Playing);
        self.react_to_grid_change();
    }

    /// Advance the level timer. No-op outside `Playing`.
    pub fn tick(&mut self, dt: f32) {
        if self.state != SessionState::Playing || dt <= 0.0 {
            return;
        }
        self.time_remaining = (self.time_remaining - dt).max(0.0);
        self.events.push_back(EngineEvent::TimerTick {
            remaining: self.time_remaining,
        });
        if self.time_remaining <= 0.0 {
            self.fail(FailCause::TimedOut);
        }
    }

    /// Handle a tap on a grid cell. Returns whether an activation was
    /// accepted; rejections are expected traffic and mutate nothing.
    pub fn activate_at(&mut self, pos: GridPos) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        let Some(id) = self.grid.passenger_at(pos) else {
            debug!("tap on {pos}: no passenger");
            return false;
        };
        let (color, activated) = {
            let passenger = self.passenger_record(id);
            (passenger.color, passenger.activated)
        };
        if activated || self.in_flight.contains_key(&id) {
            // One journey per passenger at a time: a tunnel injection still
            // in flight keeps its passenger untappable until the arrival
            // callback lands.
            debug!("tap on {pos}: journey outstanding for {id}");
            return false;
        }
        let Some(path) = self.grid.path_to_exit_row(pos) else {
            debug!("tap on {pos}: exit row unreachable");
            return false;
        };
        let Some(destination) = assign::try_assign(&mut self.ferries, &mut self.bench, id, color)
        else {
            return false;
        };

        // Reservation is in hand; commit the grid removal before the visual
        // journey starts so other reachability queries see the cell free.
        self.passenger_record_mut(id).activated = true;
        let removed = self.grid.remove_passenger(pos);
        debug_assert_eq!(removed, Some(id));

        let journey = match destination {
            Destination::Bench { slot } => Journey::ToBench { slot },
            Destination::Ferry { .. } => Journey::ToFerry,
        };
        self.in_flight.insert(id, journey);
        self.events.push_back(EngineEvent::MovePassenger {
            id,
            path,
            destination,
        });

        self.react_to_grid_change();
        if matches!(destination, Destination::Bench { .. }) {
            self.check_bench_lock();
        }
        true
    }

    /// Arrival callback from the movement collaborator: the passenger's
    /// visual journey (grid exit, bench hop, boarding, or tunnel injection)
    /// has settled. Called exactly once per dispatched command.
    ///
    /// # Panics
    ///
    /// Panics on an arrival for a passenger with no journey in flight; that
    /// is a host-integration bug that would corrupt win/lose evaluation.
    pub fn notify_arrived(&mut self, id: PassengerId) {
        if self.state.is_terminal() {
            // Journeys still in flight when the session ends are dropped.
            debug!("arrival for {id} ignored in state {:?}", self.state);
            return;
        }
        let journey = self
            .in_flight
            .remove(&id)
            .unwrap_or_else(|| panic!("arrival for {id} with no journey in flight"));
        match journey {
            Journey::FromTunnel { tunnel } => {
                self.tunnels[tunnel].finish_spawn(id);
                self.react_to_grid_change();
            }
            Journey::ToBench { slot } => {
                self.bench.settle(slot, id);
                // The docked ferry may have changed since assignment; the
                // newly settled passenger gets the same offer a docking
                // would make.
                self.reevaluate_bench();
                self.check_bench_lock();
            }
            Journey::ToFerry => self.board_docked_ferry(id),
        }
    }

    fn board_docked_ferry(&mut self, id: PassengerId) {
        // Boarding completes the passenger's lifecycle.
        let removed = self.passengers.remove(&id);
        debug_assert!(removed.is_some(), "boarding passenger must exist");

        let ferry = self
            .ferries
            .docked_mut()
            .expect("boarding arrival with an empty berth");
        let ready_to_depart = ferry.register_boarding();
        self.events.push_back(EngineEvent::FerryBoarded {
            arrival_order: ferry.arrival_order,
            boarded: ferry.boarded(),
            capacity: ferry.capacity,
        });
        if !ready_to_depart {
            return;
        }

        let departed = self.ferries.depart_docked();
        info!("ferry {} departed", departed.arrival_order);
        self.events.push_back(EngineEvent::FerryDeparted {
            arrival_order: departed.arrival_order,
            color: departed.color,
        });

        if self.ferries.is_exhausted() {
            self.set_state(SessionState::Won);
            return;
        }
        self.dock_and_announce();
        self.reevaluate_bench();
        self.check_bench_lock();
    }

    fn dock_and_announce(&mut self) {
        let Some(ferry) = self.ferries.dock_next() else {
            return;
        };
        info!("ferry {} docked", ferry.arrival_order);
        self.events.push_back(EngineEvent::FerryDocked {
            arrival_order: ferry.arrival_order,
            color: ferry.color,
            capacity: ferry.capacity,
        });
    }

    /// Offer every settled bench occupant to the docked ferry, in ascending
    /// slot order, until the ferry fills or the scan completes.
    fn reevaluate_bench(&mut self) {
        let seated: Vec<_> = self.bench.settled_occupants().collect();
        for (slot, id) in seated {
            let color = self.passenger_record(id).color;
            let Some(ferry) = self.ferries.docked_mut() else {
                break;
            };
            if ferry.is_full() {
                break;
            }
            if ferry.color != color {
                continue;
            }
            ferry.assign();
            let arrival_order = ferry.arrival_order;
            self.bench.release(slot);
            self.in_flight.insert(id, Journey::ToFerry);
            self.events.push_back(EngineEvent::MovePassenger {
                id,
                path: Vec::new(),
                destination: Destination::Ferry { arrival_order },
            });
        }
    }

    /// Lose when nobody can possibly move: every bench slot is taken and the
    /// docked ferry (if any) has no capacity left.
    fn check_bench_lock(&mut self) {
        if self.state != SessionState::Playing || !self.bench.is_full() {
            return;
        }
        let docked_has_room = self.ferries.docked().is_some_and(|f| !f.is_full());
        if !docked_has_room {
            self.fail(FailCause::BenchLocked);
        }
    }

    /// Inject pending tunnel passengers wherever an exit cell is free, then
    /// recompute reachability cues for everyone still on the grid.
    fn react_to_grid_change(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        for index in 0..self.tunnels.len() {
            if !self.tunnels[index].can_spawn(&self.grid) {
                continue;
            }
            let id = PassengerId(self.next_passenger_id);
            self.next_passenger_id += 1;

            let tunnel = &mut self.tunnels[index];
            let color = tunnel.begin_spawn(id);
            let mouth = tunnel.position();
            let exit = tunnel.exit_position();
            let remaining = tunnel.remaining();

            let placed = self.grid.place_passenger(exit, id);
            debug_assert!(placed, "can_spawn guarantees a walkable exit");
            self.passengers
                .insert(id, Passenger::new(id, color, exit, false));
            self.in_flight.insert(id, Journey::FromTunnel { tunnel: index });
            self.events.push_back(EngineEvent::SpawnPassenger {
                id,
                color,
                tunnel: mouth,
                exit,
            });
            self.events.push_back(EngineEvent::TunnelCountChanged {
                tunnel: mouth,
                remaining,
            });
        }
        self.refresh_mobility();
    }

    fn refresh_mobility(&mut self) {
        for (pos, id) in self.grid.passenger_cells() {
            let can_move = self.grid.reaches_exit_row(pos);
            let passenger = self.passenger_record_mut(id);
            if passenger.hidden && can_move {
                passenger.hidden = false;
                let color = passenger.color;
                self.events
                    .push_back(EngineEvent::PassengerRevealed { id, color });
            }
            let passenger = self.passenger_record_mut(id);
            if passenger.can_move != can_move {
                passenger.can_move = can_move;
                self.events
                    .push_back(EngineEvent::PassengerMobilityChanged { id, can_move });
            }
        }
    }

    fn fail(&mut self, cause: FailCause) {
        if self.state.is_terminal() {
            return;
        }
        self.fail_cause = Some(cause);
        self.set_state(SessionState::Failed);
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        info!("session state {:?} -> {state:?}", self.state);
        self.state = state;
        self.events
            .push_back(EngineEvent::SessionStateChanged { state });
    }

    fn passenger_record(&self, id: PassengerId) -> &Passenger {
        self.passengers
            .get(&id)
            .unwrap_or_else(|| panic!("unknown passenger {id}"))
    }

    fn passenger_record_mut(&mut self, id: PassengerId) -> &mut Passenger {
        self.passengers
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown passenger {id}"))
    }
}
