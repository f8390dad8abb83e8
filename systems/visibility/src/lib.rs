#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Light propagation and observer perception over the battle grid.
//!
//! [`compute_light_field`] starts from an ambient level supplied by the
//! embedder and lets every active light source brighten the cells it can
//! reach with an unobstructed line. [`perceive`] then combines that field
//! with an observer's position, line of sight and special senses.

use std::collections::{BTreeMap, BTreeSet};

use battle_grid_core::{
    AoeRequest, AoeShape, CellCoord, CombatantSnapshot, CombatantView, GridDimensions,
    LightAnchor, LightLevel, LightSource,
};
use battle_grid_system_area_of_effect::affected_cells_on_grid;
use battle_grid_system_line_of_sight::has_line_of_sight;
use battle_grid_world::Grid;
use tracing::debug;

/// Light level of every cell on a grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightField {
    dimensions: GridDimensions,
    levels: Vec<LightLevel>,
}

impl LightField {
    /// Creates a field where every cell shares the same level.
    #[must_use]
    pub fn uniform(dimensions: GridDimensions, level: LightLevel) -> Self {
        Self {
            dimensions,
            levels: vec![level; dimensions.cell_count()],
        }
    }

    /// Dimensions of the grid the field covers.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Light level at the cell, if it lies on the grid.
    #[must_use]
    pub fn level_at(&self, cell: CellCoord) -> Option<LightLevel> {
        self.dimensions
            .index_of(cell)
            .and_then(|index| self.levels.get(index))
            .copied()
    }

    /// Every cell paired with its light level in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, LightLevel)> + '_ {
        self.dimensions.cells().zip(self.levels.iter().copied())
    }

    /// Stamps magical darkness over the provided cells, ignoring off-grid ones.
    ///
    /// Ordinary light never lifts magical darkness once it is applied.
    pub fn apply_magical_darkness(&mut self, cells: impl IntoIterator<Item = CellCoord>) {
        for cell in cells {
            if let Some(level) = self.slot_mut(cell) {
                *level = LightLevel::MagicalDarkness;
            }
        }
    }

    fn brighten(&mut self, cell: CellCoord, incoming: LightLevel) {
        if let Some(level) = self.slot_mut(cell) {
            *level = level.brightened_by(incoming);
        }
    }

    fn slot_mut(&mut self, cell: CellCoord) -> Option<&mut LightLevel> {
        let index = self.dimensions.index_of(cell)?;
        self.levels.get_mut(index)
    }
}

/// Cell a light source shines from, if its anchor can be resolved.
#[must_use]
pub fn resolve_light_position(
    source: &LightSource,
    combatants: &CombatantView,
) -> Option<CellCoord> {
    match source.anchor {
        LightAnchor::Point(cell) => Some(cell),
        LightAnchor::Combatant(id) => combatants.get(id).map(|combatant| combatant.position),
    }
}

/// Computes the light level of every cell for the given round.
///
/// Sources whose anchor cannot be resolved, whose position is off the grid or
/// which have expired by `round` are skipped. Light never dims a cell and
/// never penetrates magical darkness already present in `ambient`.
#[must_use]
pub fn compute_light_field(
    grid: &Grid,
    ambient: LightLevel,
    sources: &[LightSource],
    combatants: &CombatantView,
    round: u32,
) -> LightField {
    let mut field = LightField::uniform(grid.dimensions(), ambient);
    for source in sources {
        illuminate(&mut field, grid, source, combatants, round);
    }
    field
}

fn illuminate(
    field: &mut LightField,
    grid: &Grid,
    source: &LightSource,
    combatants: &CombatantView,
    round: u32,
) {
    if !source.is_active_in(round) {
        debug!(source = source.id.get(), round, "skipping expired light source");
        return;
    }
    let Some(position) = resolve_light_position(source, combatants) else {
        debug!(source = source.id.get(), "skipping light source without an anchor");
        return;
    };
    if !grid.within_bounds(position) {
        debug!(source = source.id.get(), %position, "skipping off-grid light source");
        return;
    }

    let tiers = [
        (source.bright_radius, LightLevel::Bright),
        (source.total_radius(), LightLevel::Dim),
    ];
    for (radius, level) in tiers {
        if radius == 0 {
            continue;
        }
        let request = AoeRequest::new(AoeShape::Sphere, position, radius);
        for cell in affected_cells_on_grid(grid, &request) {
            if has_line_of_sight(grid, position, cell) {
                field.brighten(cell, level);
            }
        }
    }
}

/// How clearly an observer perceives a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Perception {
    /// Seen without impairment.
    Clear,
    /// Seen as through dim light: lightly obscured.
    Obscured,
    /// Not seen at all.
    Hidden,
}

impl Perception {
    /// Reports whether the cell is seen at all.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// Classifies every grid cell for the observer.
///
/// An observer standing off the grid perceives nothing and yields an empty
/// map; otherwise every cell of the grid is present.
#[must_use]
pub fn perceive(
    observer: &CombatantSnapshot,
    grid: &Grid,
    field: &LightField,
) -> BTreeMap<CellCoord, Perception> {
    if grid.tile_at(observer.position).is_none() {
        return BTreeMap::new();
    }

    grid.cells()
        .map(|cell| (cell, perceive_cell(observer, grid, field, cell)))
        .collect()
}

/// Cells the observer can see, in any clarity.
#[must_use]
pub fn visible_cells(
    observer: &CombatantSnapshot,
    grid: &Grid,
    field: &LightField,
) -> BTreeSet<CellCoord> {
    perceive(observer, grid, field)
        .into_iter()
        .filter(|(_, perception)| perception.is_visible())
        .map(|(cell, _)| cell)
        .collect()
}

/// Reports whether the observer can see the target cell.
#[must_use]
pub fn can_see(
    observer: &CombatantSnapshot,
    grid: &Grid,
    field: &LightField,
    target: CellCoord,
) -> bool {
    grid.tile_at(observer.position).is_some()
        && grid.within_bounds(target)
        && perceive_cell(observer, grid, field, target).is_visible()
}

fn perceive_cell(
    observer: &CombatantSnapshot,
    grid: &Grid,
    field: &LightField,
    cell: CellCoord,
) -> Perception {
    if !has_line_of_sight(grid, observer.position, cell) {
        return Perception::Hidden;
    }

    let distance = observer.position.distance_in_length_units(cell);
    let senses = observer.senses;
    let reaches = |range: u32| range > 0 && distance <= range;

    match field.level_at(cell) {
        Some(LightLevel::Bright) => Perception::Clear,
        Some(LightLevel::Dim) => Perception::Obscured,
        Some(LightLevel::Darkness) if reaches(senses.truesight) => Perception::Clear,
        Some(LightLevel::Darkness) if reaches(senses.darkvision) => Perception::Obscured,
        Some(LightLevel::MagicalDarkness) if reaches(senses.truesight) => Perception::Clear,
        Some(LightLevel::Darkness | LightLevel::MagicalDarkness) | None => Perception::Hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magical_darkness_survives_later_light() {
        let dimensions = GridDimensions::new(3, 1);
        let mut field = LightField::uniform(dimensions, LightLevel::Dim);
        field.apply_magical_darkness([CellCoord::new(1, 0), CellCoord::new(9, 9)]);
        field.brighten(CellCoord::new(1, 0), LightLevel::Bright);
        field.brighten(CellCoord::new(0, 0), LightLevel::Bright);

        assert_eq!(
            field.iter().map(|(_, level)| level).collect::<Vec<_>>(),
            vec![
                LightLevel::Bright,
                LightLevel::MagicalDarkness,
                LightLevel::Dim
            ]
        );
        assert_eq!(field.level_at(CellCoord::new(3, 0)), None);
    }

    #[test]
    fn only_hidden_cells_are_invisible() {
        assert!(Perception::Clear.is_visible());
        assert!(Perception::Obscured.is_visible());
        assert!(!Perception::Hidden.is_visible());
    }
}
