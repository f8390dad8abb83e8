#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tile lattice for a battle map.
//!
//! The [`Grid`] owns one [`Tile`] per cell of a fixed rectangle. Query
//! systems only ever borrow it; editors that need different terrain replace
//! tile records wholesale through [`Grid::replace_tile`].

pub mod layout;
pub mod navigation;

use battle_grid_core::{CellCoord, GridDimensions, MapTheme, TerrainKind, Tile};
use thiserror::Error;

/// Reasons a grid cannot be constructed or edited.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// Width or height is zero.
    #[error("grid dimensions {width}x{height} contain no cells")]
    Empty {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A tile lies outside the grid rectangle.
    #[error("tile {cell} lies outside the {width}x{height} grid")]
    OutOfBounds {
        /// Coordinate of the offending tile.
        cell: CellCoord,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
    /// The same cell was supplied twice.
    #[error("tile {cell} was supplied more than once")]
    DuplicateTile {
        /// Coordinate supplied twice.
        cell: CellCoord,
    },
}

/// Fixed-size battle map owning one tile per cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    dimensions: GridDimensions,
    theme: MapTheme,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid whose every tile is plain floor.
    pub fn new(width: u32, height: u32, theme: MapTheme) -> Result<Self, GridError> {
        Self::from_tiles(width, height, theme, Vec::new())
    }

    /// Creates a grid from explicit tiles; cells without a tile default to floor.
    pub fn from_tiles(
        width: u32,
        height: u32,
        theme: MapTheme,
        tiles: impl IntoIterator<Item = Tile>,
    ) -> Result<Self, GridError> {
        let dimensions = GridDimensions::new(width, height);
        let cell_count = dimensions.cell_count();
        if cell_count == 0 {
            return Err(GridError::Empty { width, height });
        }

        let mut slots: Vec<Option<Tile>> = vec![None; cell_count];
        for tile in tiles {
            let cell = tile.cell();
            let index = dimensions
                .index_of(cell)
                .ok_or(GridError::OutOfBounds {
                    cell,
                    width,
                    height,
                })?;
            if slots[index].is_some() {
                return Err(GridError::DuplicateTile { cell });
            }
            slots[index] = Some(tile);
        }

        let tiles = slots
            .into_iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.or_else(|| {
                    dimensions
                        .cell_at(index)
                        .map(|cell| Tile::new(cell, TerrainKind::Floor))
                })
            })
            .collect();

        Ok(Self {
            dimensions,
            theme,
            tiles,
        })
    }

    /// Width and height of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.dimensions.width()
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.dimensions.height()
    }

    /// Theme the map was generated with.
    #[must_use]
    pub const fn theme(&self) -> MapTheme {
        self.theme
    }

    /// Reports whether the cell lies on the grid.
    #[must_use]
    pub fn within_bounds(&self, cell: CellCoord) -> bool {
        self.dimensions.contains(cell)
    }

    /// Tile stored at the provided cell, if it lies on the grid.
    #[must_use]
    pub fn tile_at(&self, cell: CellCoord) -> Option<&Tile> {
        self.dimensions
            .index_of(cell)
            .and_then(|index| self.tiles.get(index))
    }

    /// Iterator over every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        self.dimensions.cells()
    }

    /// Replaces the tile at the new tile's cell, returning the previous record.
    pub fn replace_tile(&mut self, tile: Tile) -> Result<Tile, GridError> {
        let cell = tile.cell();
        let (width, height) = (self.width(), self.height());
        let Some(slot) = self
            .dimensions
            .index_of(cell)
            .and_then(|index| self.tiles.get_mut(index))
        else {
            return Err(GridError::OutOfBounds {
                cell,
                width,
                height,
            });
        };
        Ok(std::mem::replace(slot, tile))
    }
}
