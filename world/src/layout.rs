//! ASCII layout parser used to author battle maps by hand.
//!
//! | Glyph | Tile                                                  |
//! |-------|-------------------------------------------------------|
//! | `.`   | floor                                                 |
//! | `,`   | grass                                                 |
//! | `^`   | rock                                                  |
//! | `:`   | sand                                                  |
//! | `%`   | mud                                                   |
//! | `~`   | water                                                 |
//! | `"`   | difficult terrain                                     |
//! | `#`   | wall                                                  |
//! | `P`   | floor with a pillar: blocks movement, grants cover    |
//! | `B`   | rock with a boulder: blocks movement, grants cover    |
//! | `T`   | grass with a tree: blocks sight, grants cover         |

use battle_grid_core::{CellCoord, Decoration, MapTheme, TerrainKind, Tile};
use thiserror::Error;

use crate::{Grid, GridError};

/// Reasons an ASCII layout cannot be turned into a grid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The layout contains no rows.
    #[error("layout contains no rows")]
    Empty,
    /// A row's length differs from the first row.
    #[error("row {row} has {found} glyphs but the first row has {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Glyph count of the first row.
        expected: usize,
        /// Glyph count of the offending row.
        found: usize,
    },
    /// A glyph is not part of the legend.
    #[error("unknown glyph `{glyph}` at {cell}")]
    UnknownGlyph {
        /// Offending glyph.
        glyph: char,
        /// Cell the glyph describes.
        cell: CellCoord,
    },
    /// The layout is too large to index.
    #[error("layout dimensions exceed the supported grid size")]
    TooLarge,
    /// The parsed tiles do not form a valid grid.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Parses rows of legend glyphs into a grid; row `y` holds the cells `(x, y)`.
pub fn parse_layout<S>(rows: &[S], theme: MapTheme) -> Result<Grid, LayoutError>
where
    S: AsRef<str>,
{
    let Some(first) = rows.first() else {
        return Err(LayoutError::Empty);
    };
    let expected = first.as_ref().chars().count();

    let mut tiles = Vec::with_capacity(expected * rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        let found = row.as_ref().chars().count();
        if found != expected {
            return Err(LayoutError::RaggedRow {
                row: row_index,
                expected,
                found,
            });
        }

        let y = i32::try_from(row_index).map_err(|_| LayoutError::TooLarge)?;
        for (column_index, glyph) in row.as_ref().chars().enumerate() {
            let x = i32::try_from(column_index).map_err(|_| LayoutError::TooLarge)?;
            let cell = CellCoord::new(x, y);
            let tile =
                tile_for_glyph(glyph, cell).ok_or(LayoutError::UnknownGlyph { glyph, cell })?;
            tiles.push(tile);
        }
    }

    let width = u32::try_from(expected).map_err(|_| LayoutError::TooLarge)?;
    let height = u32::try_from(rows.len()).map_err(|_| LayoutError::TooLarge)?;
    Ok(Grid::from_tiles(width, height, theme, tiles)?)
}

/// Glyph that [`parse_layout`] would read back as the provided tile.
#[must_use]
pub fn glyph_for_tile(tile: &Tile) -> char {
    match (tile.decoration(), tile.terrain()) {
        (Some(Decoration::Pillar), _) => 'P',
        (Some(Decoration::Boulder), _) => 'B',
        (Some(Decoration::Tree), _) => 'T',
        (_, TerrainKind::Floor) => '.',
        (_, TerrainKind::Grass) => ',',
        (_, TerrainKind::Rock) => '^',
        (_, TerrainKind::Sand) => ':',
        (_, TerrainKind::Mud) => '%',
        (_, TerrainKind::Water) => '~',
        (_, TerrainKind::Difficult) => '"',
        (_, TerrainKind::Wall) => '#',
    }
}

fn tile_for_glyph(glyph: char, cell: CellCoord) -> Option<Tile> {
    let tile = match glyph {
        '.' => Tile::new(cell, TerrainKind::Floor),
        ',' => Tile::new(cell, TerrainKind::Grass),
        '^' => Tile::new(cell, TerrainKind::Rock),
        ':' => Tile::new(cell, TerrainKind::Sand),
        '%' => Tile::new(cell, TerrainKind::Mud),
        '~' => Tile::new(cell, TerrainKind::Water),
        '"' => Tile::new(cell, TerrainKind::Difficult),
        '#' => Tile::new(cell, TerrainKind::Wall),
        'P' => Tile::new(cell, TerrainKind::Floor)
            .with_decoration(Decoration::Pillar)
            .with_movement_blocked(true)
            .with_cover(true),
        'B' => Tile::new(cell, TerrainKind::Rock)
            .with_decoration(Decoration::Boulder)
            .with_movement_blocked(true)
            .with_cover(true),
        'T' => Tile::new(cell, TerrainKind::Grass)
            .with_decoration(Decoration::Tree)
            .with_sight_blocked(true)
            .with_cover(true),
        _ => return None,
    };
    Some(tile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_into_tiles() {
        let grid = parse_layout(&["..#", "~P.", "T,\""], MapTheme::Forest).expect("layout");

        assert_eq!((grid.width(), grid.height()), (3, 3));
        let wall = grid.tile_at(CellCoord::new(2, 0)).expect("wall");
        assert!(wall.blocks_line_of_sight() && wall.blocks_movement());

        let pillar = grid.tile_at(CellCoord::new(1, 1)).expect("pillar");
        assert_eq!(pillar.decoration(), Some(Decoration::Pillar));
        assert!(!pillar.is_passable());
        assert!(!pillar.blocks_line_of_sight());

        let water = grid.tile_at(CellCoord::new(0, 1)).expect("water");
        assert_eq!(water.movement_cost().multiplier(), Some(2));

        let tree = grid.tile_at(CellCoord::new(0, 2)).expect("tree");
        assert!(tree.blocks_line_of_sight() && tree.is_passable());
    }

    #[test]
    fn glyphs_survive_a_render_pass() {
        let rows = [".,^:%", "~\"#PB", "T...."];
        let grid = parse_layout(&rows, MapTheme::Dungeon).expect("layout");
        let rendered: Vec<String> = (0..3)
            .map(|y| {
                (0..5)
                    .filter_map(|x| grid.tile_at(CellCoord::new(x, y)).map(glyph_for_tile))
                    .collect()
            })
            .collect();
        assert_eq!(rendered, rows);
    }

    #[test]
    fn rejects_malformed_layouts() {
        let empty: [&str; 0] = [];
        assert_eq!(parse_layout(&empty, MapTheme::Dungeon), Err(LayoutError::Empty));
        assert_eq!(
            parse_layout(&["...", ".."], MapTheme::Dungeon),
            Err(LayoutError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            parse_layout(&[".?."], MapTheme::Dungeon),
            Err(LayoutError::UnknownGlyph {
                glyph: '?',
                cell: CellCoord::new(1, 0)
            })
        );
        assert!(matches!(
            parse_layout(&[""], MapTheme::Dungeon),
            Err(LayoutError::Grid(GridError::Empty { .. }))
        ));
    }
}
