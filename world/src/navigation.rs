//! Eight-way neighbourhood stepping shared by the movement queries.

use battle_grid_core::{CellCoord, GridDimensions};

const OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Single king move from one cell into a neighbour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Step {
    /// Cell entered by the step.
    pub cell: CellCoord,
    /// Whether the step moves along both axes at once.
    pub diagonal: bool,
}

/// Steps from `cell` into every neighbour that lies on the grid.
///
/// Neighbours are yielded clockwise starting from north so that callers
/// expanding a frontier observe a deterministic order.
pub fn steps(cell: CellCoord, dimensions: GridDimensions) -> impl Iterator<Item = Step> {
    let mut candidates = [None; 8];
    let mut count = 0;

    for (dx, dy) in OFFSETS {
        let neighbor = cell.offset(dx, dy);
        if !dimensions.contains(neighbor) {
            continue;
        }

        candidates[count] = Some(Step {
            cell: neighbor,
            diagonal: dx != 0 && dy != 0,
        });
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

/// Classifies the move between two cells, if they are distinct king-move neighbours.
#[must_use]
pub fn step_between(from: CellCoord, to: CellCoord) -> Option<Step> {
    if from == to || from.chebyshev_distance(to) != 1 {
        return None;
    }

    Some(Step {
        cell: to,
        diagonal: from.x() != to.x() && from.y() != to.y(),
    })
}
