//! ASCII layouts: `#` for walls, `.` for floor, `o` for floor with a pellet.

use gridchase_core::{CellCoord, Grid, Tile};
use thiserror::Error;

use crate::{TileMap, WALL_TEXTURE};

const WALL_GLYPH: char = '#';
const FLOOR_GLYPH: char = '.';
const PELLET_GLYPH: char = 'o';

/// Errors that can occur while parsing an ASCII layout.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The layout contained no non-blank rows.
    #[error("layout contains no rows")]
    Empty,
    /// A row was shorter or longer than the first row.
    #[error("row {row} has {found} tiles but {expected} were expected")]
    Ragged {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A character outside the layout alphabet was encountered.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based column of the character.
        column: usize,
        /// Zero-based row of the character.
        row: usize,
    },
    /// The layout does not fit into 32-bit dimensions.
    #[error("layout is too large")]
    TooLarge,
}

impl TileMap {
    /// Parses a bounded, four-connected map from an ASCII layout.
    ///
    /// Leading and trailing whitespace on each line is ignored, as are blank
    /// lines, so layouts can be indented inside string literals.
    pub fn from_layout(text: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(LayoutError::Empty);
        };

        let expected = first.chars().count();
        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != expected {
                return Err(LayoutError::Ragged {
                    row,
                    expected,
                    found,
                });
            }

            for (column, glyph) in line.chars().enumerate() {
                tiles.push(tile_for(glyph).ok_or(LayoutError::UnknownGlyph {
                    glyph,
                    column,
                    row,
                })?);
            }
        }

        let width = u32::try_from(expected).map_err(|_| LayoutError::TooLarge)?;
        let height = u32::try_from(rows.len()).map_err(|_| LayoutError::TooLarge)?;
        let grid = Grid::from_vec(width, height, tiles).map_err(|_| LayoutError::TooLarge)?;
        Ok(Self::from_tiles(grid))
    }

    /// Renders the map back into the layout alphabet, one line per row.
    #[must_use]
    pub fn to_layout(&self) -> String {
        let mut text = String::with_capacity(self.tiles().len() + self.height() as usize);
        for row in 0..self.height() {
            for column in 0..self.width() {
                let glyph = match self.tile(CellCoord::new(column, row)) {
                    Some(tile) if tile.is_solid() => WALL_GLYPH,
                    Some(tile) if tile.has_pellet() => PELLET_GLYPH,
                    _ => FLOOR_GLYPH,
                };
                text.push(glyph);
            }
            text.push('\n');
        }
        text
    }
}

fn tile_for(glyph: char) -> Option<Tile> {
    match glyph {
        WALL_GLYPH => Some(Tile::SOLID.with_texture(WALL_TEXTURE)),
        FLOOR_GLYPH => Some(Tile::OPEN),
        PELLET_GLYPH => Some(Tile::OPEN.with_pellet()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_indented_layout() {
        let map = TileMap::from_layout(
            "
            ..#
            o.#
            ",
        )
        .expect("valid layout");

        assert_eq!((map.width(), map.height()), (3, 2));
        assert!(map.is_solid(CellCoord::new(2, 0)));
        assert!(map
            .tile(CellCoord::new(0, 1))
            .is_some_and(|tile| tile.has_pellet()));
        assert_eq!(map.to_layout(), "..#\no.#\n");
    }

    #[test]
    fn rejects_ragged_rows() {
        let error = TileMap::from_layout("...\n..").expect_err("ragged");
        assert_eq!(
            error,
            LayoutError::Ragged {
                row: 1,
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn rejects_unknown_glyphs() {
        let error = TileMap::from_layout(".x.").expect_err("unknown glyph");
        assert_eq!(
            error,
            LayoutError::UnknownGlyph {
                glyph: 'x',
                column: 1,
                row: 0,
            }
        );
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(TileMap::from_layout("  \n\n"), Err(LayoutError::Empty));
    }
}
