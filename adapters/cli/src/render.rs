//! ASCII overlays drawn on top of the battle map.

use std::{collections::BTreeMap, fmt};

use battle_grid_core::{CellCoord, CombatantSnapshot};
use battle_grid_world::{layout::glyph_for_tile, Grid};

/// Map rendering with per-cell glyph overrides.
#[derive(Debug)]
pub(crate) struct Overlay<'g> {
    grid: &'g Grid,
    marks: BTreeMap<CellCoord, char>,
}

impl<'g> Overlay<'g> {
    /// Starts an overlay that shows the bare layout.
    pub(crate) fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            marks: BTreeMap::new(),
        }
    }

    /// Replaces the glyph at `cell`; later marks win. Off-grid cells are ignored.
    pub(crate) fn mark(&mut self, cell: CellCoord, glyph: char) {
        if self.grid.within_bounds(cell) {
            let _ = self.marks.insert(cell, glyph);
        }
    }

    /// Marks every provided cell with the same glyph.
    pub(crate) fn mark_all(&mut self, cells: impl IntoIterator<Item = CellCoord>, glyph: char) {
        for cell in cells {
            self.mark(cell, glyph);
        }
    }

    /// Marks each combatant with the initial of its name, or `x` when down.
    pub(crate) fn mark_combatants<'a>(
        &mut self,
        combatants: impl IntoIterator<Item = &'a CombatantSnapshot>,
    ) {
        for combatant in combatants {
            let glyph = if combatant.is_alive() {
                combatant.name.chars().next().unwrap_or('@')
            } else {
                'x'
            };
            self.mark(combatant.position, glyph);
        }
    }
}

impl fmt::Display for Overlay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.grid.width();
        for tile in self.grid.tiles() {
            let cell = tile.cell();
            let glyph = self
                .marks
                .get(&cell)
                .copied()
                .unwrap_or_else(|| glyph_for_tile(tile));
            write!(f, "{glyph}")?;
            if u32::try_from(cell.x()).map_or(false, |x| x + 1 == width) {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_grid_core::{CombatantId, MapTheme, MovementBudget, Senses, Team};
    use battle_grid_world::layout::parse_layout;

    #[test]
    fn marks_override_layout_glyphs() {
        let grid = parse_layout(&["#..", ".~."], MapTheme::Dungeon).expect("layout");
        let mut overlay = Overlay::new(&grid);
        overlay.mark_all([CellCoord::new(1, 0), CellCoord::new(2, 0)], '*');
        overlay.mark(CellCoord::new(2, 0), 'G');
        overlay.mark(CellCoord::new(7, 7), '!');

        assert_eq!(overlay.to_string(), "#*G\n.~.\n");
    }

    #[test]
    fn fallen_combatants_are_crossed_out() {
        let grid = parse_layout(&["...."], MapTheme::Dungeon).expect("layout");
        let fighter = |id: u32, name: &str, x: i32, hit_points: i32| CombatantSnapshot {
            id: CombatantId::new(id),
            name: name.to_owned(),
            position: CellCoord::new(x, 0),
            movement: MovementBudget::new(30),
            senses: Senses::default(),
            hit_points,
            team: Team::Player,
            initiative: 10,
            initiative_modifier: 0,
        };
        let roster = [fighter(1, "Aria", 0, 5), fighter(2, "Ghoul", 3, 0)];
        let mut overlay = Overlay::new(&grid);
        overlay.mark_combatants(&roster);

        assert_eq!(overlay.to_string(), "A..x\n");
    }
}
