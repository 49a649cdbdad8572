//! Grid occupancy model and exit-row connectivity search.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use crate::constants::EXIT_ROW;
use crate::passenger::PassengerId;

/// Logical grid coordinates. Row `y = 0` is the exit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four cardinal neighbors, in a fixed expansion order.
    #[must_use]
    pub const fn neighbors(self) -> [Self; 4] {
        [
            Self::new(self.x, self.y + 1),
            Self::new(self.x, self.y - 1),
            Self::new(self.x + 1, self.y),
            Self::new(self.x - 1, self.y),
        ]
    }

    /// Whether this cell lies on the exit row.
    #[must_use]
    pub const fn on_exit_row(self) -> bool {
        self.y == EXIT_ROW
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal direction of a tunnel mouth's exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::South => (0, -1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    /// Cell adjacent to `from` in this direction.
    #[must_use]
    pub const fn step(self, from: GridPos) -> GridPos {
        let (dx, dy) = self.offset();
        GridPos::new(from.x + dx, from.y + dy)
    }
}

/// What currently sits on a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellOccupant {
    Passenger(PassengerId),
    /// A tunnel mouth permanently blocks its own cell; injections land on the
    /// adjacent exit cell.
    TunnelMouth,
}

/// Grid dimensions, invalid holes, and the cell-to-occupant mapping.
///
/// A cell is walkable iff it is in bounds, not an invalid hole, and has no
/// occupant. Removal of an occupant takes effect immediately; callers commit
/// the logical move before any visual motion begins so concurrent reachability
/// queries never observe a stale occupied cell.
#[derive(Debug, Clone)]
pub struct GridModel {
    width: i32,
    height: i32,
    invalid: HashSet<GridPos>,
    occupants: HashMap<GridPos, CellOccupant>,
}

impl GridModel {
    #[must_use]
    pub fn new(width: i32, height: i32, invalid: HashSet<GridPos>) -> Self {
        Self {
            width,
            height,
            invalid,
            occupants: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    #[must_use]
    pub const fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// In bounds and not an invalid hole. Says nothing about occupancy.
    #[must_use]
    pub fn is_valid_cell(&self, pos: GridPos) -> bool {
        self.in_bounds(pos) && !self.invalid.contains(&pos)
    }

    #[must_use]
    pub fn occupant(&self, pos: GridPos) -> Option<CellOccupant> {
        self.occupants.get(&pos).copied()
    }

    #[must_use]
    pub fn passenger_at(&self, pos: GridPos) -> Option<PassengerId> {
        match self.occupants.get(&pos) {
            Some(CellOccupant::Passenger(id)) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.is_valid_cell(pos) && !self.occupants.contains_key(&pos)
    }

    /// Place a passenger on a walkable cell. Returns false without mutating
    /// anything when the cell is out of bounds, invalid, or occupied.
    pub fn place_passenger(&mut self, pos: GridPos, id: PassengerId) -> bool {
        if !self.is_walkable(pos) {
            return false;
        }
        self.occupants.insert(pos, CellOccupant::Passenger(id));
        true
    }

    /// Mark a cell as blocked by a tunnel mouth. Used only during level setup.
    pub fn place_tunnel_mouth(&mut self, pos: GridPos) -> bool {
        if !self.is_walkable(pos) {
            return false;
        }
        self.occupants.insert(pos, CellOccupant::TunnelMouth);
        true
    }

    /// Clear the passenger occupying `pos`, returning its id.
    ///
    /// This is the logical commit of an activation: it must run before the
    /// passenger's visual journey starts.
    pub fn remove_passenger(&mut self, pos: GridPos) -> Option<PassengerId> {
        match self.occupants.get(&pos) {
            Some(CellOccupant::Passenger(id)) => {
                let id = *id;
                self.occupants.remove(&pos);
                Some(id)
            }
            _ => None,
        }
    }

    /// Grid passengers with their cells, sorted by position for deterministic
    /// iteration.
    #[must_use]
    pub fn passenger_cells(&self) -> Vec<(GridPos, PassengerId)> {
        let mut cells: Vec<_> = self
            .occupants
            .iter()
            .filter_map(|(pos, occ)| match occ {
                CellOccupant::Passenger(id) => Some((*pos, *id)),
                CellOccupant::TunnelMouth => None,
            })
            .collect();
        cells.sort_unstable_by_key(|(pos, _)| (pos.y, pos.x));
        cells
    }

    /// True iff a 4-directional path of walkable cells connects `pos` to the
    /// exit row. The start cell counts as visited regardless of its occupant.
    #[must_use]
    pub fn reaches_exit_row(&self, pos: GridPos) -> bool {
        if pos.on_exit_row() {
            return true;
        }
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(pos);
        queue.push_back(pos);

        while let Some(current) = queue.pop_front() {
            if current.on_exit_row() {
                return true;
            }
            for next in current.neighbors() {
                if visited.contains(&next) || !self.is_walkable(next) {
                    continue;
                }
                visited.insert(next);
                queue.push_back(next);
            }
        }
        false
    }

    /// Breadth-first path from `pos` to the nearest-by-hops exit-row cell.
    ///
    /// Returns `[pos, ..., exit_cell]`, or `[pos]` when `pos` is already on the
    /// exit row, or `None` when the frontier empties first. Every cell after
    /// the start is walkable at query time.
    #[must_use]
    pub fn path_to_exit_row(&self, pos: GridPos) -> Option<Vec<GridPos>> {
        if pos.on_exit_row() {
            return Some(vec![pos]);
        }
        let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(pos);
        queue.push_back(pos);

        let mut goal = None;
        while let Some(current) = queue.pop_front() {
            if current.on_exit_row() {
                goal = Some(current);
                break;
            }
            for next in current.neighbors() {
                if visited.contains(&next) || !self.is_walkable(next) {
                    continue;
                }
                visited.insert(next);
                came_from.insert(next, current);
                queue.push_back(next);
            }
        }

        let goal = goal?;
        let mut path = vec![goal];
        let mut current = goal;
        while current != pos {
            current = came_from[&current];
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: i32, height: i32, invalid: &[(i32, i32)]) -> GridModel {
        let invalid = invalid.iter().map(|&(x, y)| GridPos::new(x, y)).collect();
        GridModel::new(width, height, invalid)
    }

    #[test]
    fn walkable_requires_bounds_validity_and_vacancy() {
        let mut g = grid(3, 3, &[(1, 1)]);
        assert!(g.is_walkable(GridPos::new(0, 0)));
        assert!(!g.is_walkable(GridPos::new(-1, 0)));
        assert!(!g.is_walkable(GridPos::new(3, 0)));
        assert!(!g.is_walkable(GridPos::new(1, 1)));

        assert!(g.place_passenger(GridPos::new(2, 2), PassengerId(7)));
        assert!(!g.is_walkable(GridPos::new(2, 2)));
        assert!(!g.place_passenger(GridPos::new(2, 2), PassengerId(8)));
        assert_eq!(g.passenger_at(GridPos::new(2, 2)), Some(PassengerId(7)));
    }

    #[test]
    fn tunnel_mouth_blocks_cell_but_is_not_a_passenger() {
        let mut g = grid(2, 2, &[]);
        assert!(g.place_tunnel_mouth(GridPos::new(1, 1)));
        assert!(!g.is_walkable(GridPos::new(1, 1)));
        assert_eq!(g.passenger_at(GridPos::new(1, 1)), None);
        assert_eq!(g.remove_passenger(GridPos::new(1, 1)), None);
        assert_eq!(g.occupant(GridPos::new(1, 1)), Some(CellOccupant::TunnelMouth));
    }

    #[test]
    fn exit_row_cell_is_trivially_reachable() {
        let g = grid(4, 4, &[]);
        let start = GridPos::new(2, 0);
        assert!(g.reaches_exit_row(start));
        assert_eq!(g.path_to_exit_row(start), Some(vec![start]));
    }

    #[test]
    fn occupied_corridor_blocks_reachability_until_cleared() {
        let mut g = grid(1, 3, &[]);
        let top = GridPos::new(0, 2);
        assert!(g.place_passenger(top, PassengerId(1)));
        assert!(g.place_passenger(GridPos::new(0, 1), PassengerId(2)));

        // Blocked by the passenger below; the start cell itself may be occupied.
        assert!(!g.reaches_exit_row(top));
        assert!(g.path_to_exit_row(top).is_none());

        g.remove_passenger(GridPos::new(0, 1));
        assert!(g.reaches_exit_row(top));
        let path = g.path_to_exit_row(top).expect("path after clearing");
        assert_eq!(
            path,
            vec![top, GridPos::new(0, 1), GridPos::new(0, 0)]
        );
    }

    #[test]
    fn path_routes_around_invalid_holes() {
        // 3x3 with the center column punched out above the exit row.
        let g = grid(3, 3, &[(1, 1), (1, 2)]);
        let path = g.path_to_exit_row(GridPos::new(2, 2)).expect("path exists");
        assert_eq!(path.first(), Some(&GridPos::new(2, 2)));
        assert!(path.last().expect("non-empty").on_exit_row());
        for pair in path.windows(2) {
            let d = (pair[1].x - pair[0].x).abs() + (pair[1].y - pair[0].y).abs();
            assert_eq!(d, 1, "consecutive path cells must be 4-adjacent");
        }
    }

    #[test]
    fn removal_is_visible_to_subsequent_queries() {
        let mut g = grid(1, 2, &[]);
        let exit = GridPos::new(0, 0);
        let back = GridPos::new(0, 1);
        g.place_passenger(exit, PassengerId(1));
        g.place_passenger(back, PassengerId(2));
        assert!(!g.reaches_exit_row(back));

        assert_eq!(g.remove_passenger(exit), Some(PassengerId(1)));
        assert!(g.reaches_exit_row(back));
    }
}
