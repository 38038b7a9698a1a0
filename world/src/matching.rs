//! Flood-fill discovery of connected same-color groups.

use std::collections::{HashSet, VecDeque};

use tile_blast_core::{CellCoord, Direction, EntityKind, MatchResult};

use crate::grid::Grid;

/// Computes the connected match set and breakable fringe reachable from the
/// origin cell.
///
/// Returns `None` unless the origin is occupied by a matchable color entity.
/// Breadth-first over the four orthogonal neighbors: same-color occupied
/// neighbors join the match set and propagate the fill, occupied breakables
/// join the fringe without propagating, and obstacle or empty neighbors are
/// ignored. The fringe is therefore only ever directly adjacent to the match
/// set, never transitively expanded. The finite grid guarantees termination.
pub(crate) fn flood_fill(grid: &Grid, origin: CellCoord) -> Option<MatchResult> {
    let anchor = match grid.cell(origin)?.occupant()?.kind() {
        EntityKind::Color(color) => color,
        EntityKind::Breakable | EntityKind::Obstacle => return None,
    };

    let mut matched = vec![origin];
    let mut visited: HashSet<CellCoord> = HashSet::new();
    let _ = visited.insert(origin);
    let mut fringe: Vec<CellCoord> = Vec::new();
    let mut fringe_seen: HashSet<CellCoord> = HashSet::new();
    let mut frontier: VecDeque<CellCoord> = VecDeque::new();
    frontier.push_back(origin);

    while let Some(current) = frontier.pop_front() {
        for direction in Direction::ORTHOGONAL {
            let Some(neighbor) = current.offset_by(direction) else {
                continue;
            };
            let Some(entity) = grid.cell(neighbor).and_then(|cell| cell.occupant()) else {
                continue;
            };
            match entity.kind() {
                EntityKind::Color(color) if color == anchor => {
                    if visited.insert(neighbor) {
                        matched.push(neighbor);
                        frontier.push_back(neighbor);
                    }
                }
                EntityKind::Breakable => {
                    if fringe_seen.insert(neighbor) {
                        fringe.push(neighbor);
                    }
                }
                EntityKind::Color(_) | EntityKind::Obstacle => {}
            }
        }
    }

    Some(MatchResult::new(anchor, matched, fringe))
}
