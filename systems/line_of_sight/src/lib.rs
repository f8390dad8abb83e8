#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Discrete line tracing and sight blocking over the battle grid.
//!
//! Sight is decided by the cells strictly between two endpoints. A creature
//! standing inside an obstruction can still see and be seen out of it, and
//! adjacent cells always see one another.

use battle_grid_core::{CellCoord, Decoration};
use battle_grid_world::Grid;

/// Cells visited by an integer Bresenham line, both endpoints included.
///
/// The line is always rasterised from the smaller endpoint, so swapping the
/// arguments yields the same cells in reverse order.
#[must_use]
pub fn trace(from: CellCoord, to: CellCoord) -> Vec<CellCoord> {
    if to < from {
        let mut cells = rasterise(to, from);
        cells.reverse();
        return cells;
    }

    rasterise(from, to)
}

fn rasterise(from: CellCoord, to: CellCoord) -> Vec<CellCoord> {
    let (mut x, mut y) = (i64::from(from.x()), i64::from(from.y()));
    let (end_x, end_y) = (i64::from(to.x()), i64::from(to.y()));
    let dx = (end_x - x).abs();
    let dy = -(end_y - y).abs();
    let step_x = if x < end_x { 1 } else { -1 };
    let step_y = if y < end_y { 1 } else { -1 };
    let mut error = dx + dy;

    let capacity = usize::try_from(dx.max(-dy) + 1).unwrap_or(0);
    let mut cells = Vec::with_capacity(capacity);
    loop {
        if let (Ok(cx), Ok(cy)) = (i32::try_from(x), i32::try_from(y)) {
            cells.push(CellCoord::new(cx, cy));
        }
        if x == end_x && y == end_y {
            break;
        }

        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            x += step_x;
        }
        if doubled <= dx {
            error += dx;
            y += step_y;
        }
    }

    cells
}

/// Reports whether an unobstructed line joins the two cells.
///
/// Every intermediate cell must exist on the grid and must not block sight.
/// The endpoints themselves are never tested.
#[must_use]
pub fn has_line_of_sight(grid: &Grid, from: CellCoord, to: CellCoord) -> bool {
    intermediate_cells(from, to).all(|cell| {
        grid.tile_at(cell)
            .is_some_and(|tile| !tile.blocks_line_of_sight())
    })
}

/// Protection granted to a target by the terrain between it and an attacker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cover {
    /// Nothing stands in the way.
    #[default]
    None,
    /// Low walls, furniture, trees and similar obstacles.
    Half,
    /// Pillars and arrow slits.
    ThreeQuarters,
}

impl Cover {
    /// Bonus the cover adds to armour class and dexterity saves.
    #[must_use]
    pub const fn bonus(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Half => 2,
            Self::ThreeQuarters => 5,
        }
    }
}

/// Best cover any tile strictly between the two cells provides.
#[must_use]
pub fn cover_between(grid: &Grid, from: CellCoord, to: CellCoord) -> Cover {
    intermediate_cells(from, to)
        .filter_map(|cell| grid.tile_at(cell))
        .filter(|tile| tile.provides_cover())
        .map(|tile| match tile.decoration() {
            Some(Decoration::Pillar) => Cover::ThreeQuarters,
            _ => Cover::Half,
        })
        .max()
        .unwrap_or_default()
}

fn intermediate_cells(from: CellCoord, to: CellCoord) -> impl Iterator<Item = CellCoord> {
    let cells = trace(from, to);
    let inner = cells.len().saturating_sub(2);
    cells.into_iter().skip(1).take(inner)
}
