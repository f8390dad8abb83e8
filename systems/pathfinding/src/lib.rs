#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Route planning over the battle grid under the alternating diagonal rule.
//!
//! Orthogonal steps cost one tile of movement. Diagonal steps alternate
//! between one and two tiles, starting cheap, so the cost of the next diagonal
//! depends on how many diagonals the route has already taken. Every search in
//! this crate is therefore keyed by the pair (cell, diagonal parity). The
//! step cost is scaled by the multiplier of the tile being entered.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet, BinaryHeap},
};

use battle_grid_core::{CellCoord, CombatantSnapshot, GridDimensions, Tile, LENGTH_UNITS_PER_TILE};
use battle_grid_world::{
    navigation::{self, Step},
    Grid,
};

/// Admissible A* estimate: Chebyshev distance expressed in length units.
#[must_use]
pub fn heuristic(from: CellCoord, to: CellCoord) -> u32 {
    from.distance_in_length_units(to)
}

/// Concrete route between two cells together with its movement cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    cells: Vec<CellCoord>,
    cost: u32,
}

impl Route {
    /// Cells visited by the route, start and goal included.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Total movement spent along the route in length units.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Consumes the route, yielding the visited cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<CellCoord> {
        self.cells
    }
}

/// Finds the cheapest route from `start` to `goal`.
///
/// Returns `None` when either endpoint is off the grid, when either endpoint
/// cannot be stood on, or when the goal cannot be reached. A route whose start
/// equals its goal holds that single cell at zero cost.
#[must_use]
pub fn find_route(grid: &Grid, start: CellCoord, goal: CellCoord) -> Option<Route> {
    let dimensions = grid.dimensions();
    let start_index = passable_index(grid, start)?;
    let _ = passable_index(grid, goal)?;

    let mut search = Search::new(dimensions);
    search.open(state_key(start_index, Parity::Even), 0, heuristic(start, goal), None);

    while let Some((state, spent)) = search.pop() {
        let (cell, parity) = search.decode(state)?;
        if cell == goal {
            return Some(Route {
                cells: search.reconstruct(state),
                cost: spent,
            });
        }

        for step in navigation::steps(cell, dimensions) {
            let Some((next_state, cost)) = transition(grid, step, parity) else {
                continue;
            };
            let total = spent.saturating_add(cost);
            search.open(
                next_state,
                total,
                total.saturating_add(heuristic(step.cell, goal)),
                Some(state),
            );
        }
    }

    None
}

/// Finds the cheapest path from `start` to `goal` as borrowed tiles.
///
/// The path begins with the start tile. An empty path means the goal is
/// unreachable; a start equal to the goal yields that single tile.
#[must_use]
pub fn find_path<'g>(grid: &'g Grid, start: CellCoord, goal: CellCoord) -> Vec<&'g Tile> {
    find_route(grid, start, goal)
        .map(|route| {
            route
                .cells
                .iter()
                .filter_map(|cell| grid.tile_at(*cell))
                .collect()
        })
        .unwrap_or_default()
}

/// Movement cost of an explicit path, or `None` when it cannot be walked.
///
/// Each consecutive pair must be a single king move onto a passable tile. A
/// single-cell path costs nothing.
#[must_use]
pub fn path_cost(grid: &Grid, cells: &[CellCoord]) -> Option<u32> {
    let first = cells.first()?;
    let _ = grid.tile_at(*first)?;

    let mut parity = Parity::Even;
    let mut total: u32 = 0;
    for pair in cells.windows(2) {
        let step = navigation::step_between(pair[0], pair[1])?;
        let tile = grid.tile_at(step.cell).filter(|tile| tile.is_passable())?;
        let multiplier = tile.movement_cost().multiplier()?;
        let (base, next) = parity.step(step.diagonal);
        total = total.saturating_add(base.saturating_mul(multiplier));
        parity = next;
    }

    Some(total)
}

/// Minimal movement cost to every cell reachable within a budget.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReachableArea {
    costs: BTreeMap<CellCoord, u32>,
}

impl ReachableArea {
    /// Cheapest cost to reach the cell, if it lies within the budget.
    #[must_use]
    pub fn cost_to(&self, cell: CellCoord) -> Option<u32> {
        self.costs.get(&cell).copied()
    }

    /// Reports whether the cell can be reached within the budget.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.costs.contains_key(&cell)
    }

    /// Reachable cells paired with their minimal cost, in cell order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, u32)> + '_ {
        self.costs.iter().map(|(cell, cost)| (*cell, *cost))
    }

    /// Number of reachable cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// Reports whether no cell is reachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Consumes the area, yielding the reachable cells.
    #[must_use]
    pub fn into_cells(self) -> BTreeSet<CellCoord> {
        self.costs.into_keys().collect()
    }
}

/// Expands outward from `start`, keeping every cell reachable within `budget`.
///
/// The start cell is included at zero cost whenever it can be stood on.
#[must_use]
pub fn reachable_area(grid: &Grid, start: CellCoord, budget: u32) -> ReachableArea {
    let dimensions = grid.dimensions();
    let mut area = ReachableArea::default();
    let Some(start_index) = passable_index(grid, start) else {
        return area;
    };

    let mut search = Search::new(dimensions);
    search.open(state_key(start_index, Parity::Even), 0, 0, None);

    while let Some((state, spent)) = search.pop() {
        let Some((cell, parity)) = search.decode(state) else {
            continue;
        };
        let _ = area.costs.entry(cell).or_insert(spent);

        for step in navigation::steps(cell, dimensions) {
            let Some((next_state, cost)) = transition(grid, step, parity) else {
                continue;
            };
            let total = spent.saturating_add(cost);
            if total <= budget {
                search.open(next_state, total, total, Some(state));
            }
        }
    }

    area
}

/// Cells reachable from `start` within `budget` length units of movement.
#[must_use]
pub fn reachable_set(grid: &Grid, start: CellCoord, budget: u32) -> BTreeSet<CellCoord> {
    reachable_area(grid, start, budget).into_cells()
}

/// Cells the combatant can still reach with its remaining movement this turn.
#[must_use]
pub fn reachable_for(grid: &Grid, combatant: &CombatantSnapshot) -> ReachableArea {
    reachable_area(grid, combatant.position, combatant.movement.remaining())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Parity {
    Even,
    Odd,
}

impl Parity {
    const fn index(self) -> usize {
        match self {
            Self::Even => 0,
            Self::Odd => 1,
        }
    }

    /// Base cost of a step taken in this parity and the parity it leaves behind.
    const fn step(self, diagonal: bool) -> (u32, Parity) {
        match (diagonal, self) {
            (false, parity) => (LENGTH_UNITS_PER_TILE, parity),
            (true, Self::Even) => (LENGTH_UNITS_PER_TILE, Self::Odd),
            (true, Self::Odd) => (2 * LENGTH_UNITS_PER_TILE, Self::Even),
        }
    }
}

fn state_key(cell_index: usize, parity: Parity) -> usize {
    cell_index * 2 + parity.index()
}

fn passable_index(grid: &Grid, cell: CellCoord) -> Option<usize> {
    let _ = grid.tile_at(cell).filter(|tile| tile.is_passable())?;
    grid.dimensions().index_of(cell)
}

/// State entered by a step and the movement it costs, if the step is legal.
fn transition(grid: &Grid, step: Step, parity: Parity) -> Option<(usize, u32)> {
    let tile = grid.tile_at(step.cell).filter(|tile| tile.is_passable())?;
    let multiplier = tile.movement_cost().multiplier()?;
    let index = grid.dimensions().index_of(step.cell)?;
    let (base, next) = parity.step(step.diagonal);
    Some((state_key(index, next), base.saturating_mul(multiplier)))
}

/// Best-first frontier over (cell, parity) states shared by A* and Dijkstra.
#[derive(Debug)]
struct Search {
    dimensions: GridDimensions,
    best: Vec<Option<u32>>,
    parent: Vec<Option<usize>>,
    closed: Vec<bool>,
    frontier: BinaryHeap<Reverse<(u32, u64, usize)>>,
    sequence: u64,
}

impl Search {
    fn new(dimensions: GridDimensions) -> Self {
        let states = dimensions.cell_count() * 2;
        Self {
            dimensions,
            best: vec![None; states],
            parent: vec![None; states],
            closed: vec![false; states],
            frontier: BinaryHeap::new(),
            sequence: 0,
        }
    }

    /// Records a candidate cost for `state`, keeping it only if it improves.
    fn open(&mut self, state: usize, spent: u32, priority: u32, parent: Option<usize>) {
        if self.closed.get(state).copied().unwrap_or(true) {
            return;
        }
        let Some(slot) = self.best.get_mut(state) else {
            return;
        };
        if slot.is_some_and(|known| known <= spent) {
            return;
        }

        *slot = Some(spent);
        if let Some(link) = self.parent.get_mut(state) {
            *link = parent;
        }
        self.frontier.push(Reverse((priority, self.sequence, state)));
        self.sequence += 1;
    }

    /// Closes and returns the cheapest open state with its settled cost.
    fn pop(&mut self) -> Option<(usize, u32)> {
        while let Some(Reverse((_, _, state))) = self.frontier.pop() {
            let Some(closed) = self.closed.get_mut(state) else {
                continue;
            };
            if *closed {
                continue;
            }
            *closed = true;
            if let Some(spent) = self.best.get(state).copied().flatten() {
                return Some((state, spent));
            }
        }

        None
    }

    fn decode(&self, state: usize) -> Option<(CellCoord, Parity)> {
        let cell = self.dimensions.cell_at(state / 2)?;
        let parity = if state % 2 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        };
        Some((cell, parity))
    }

    fn reconstruct(&self, goal: usize) -> Vec<CellCoord> {
        let mut cells = Vec::new();
        let mut cursor = Some(goal);
        while let Some(state) = cursor {
            if let Some(cell) = self.dimensions.cell_at(state / 2) {
                cells.push(cell);
            }
            cursor = self.parent.get(state).copied().flatten();
        }
        cells.reverse();
        cells
    }
}
