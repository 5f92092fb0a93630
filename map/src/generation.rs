//! Seeded random wall placement.

use gridchase_core::{CellCoord, Tile};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{TileMap, WALL_TEXTURE};

/// Fills a map with randomly placed walls.
///
/// Each tile independently becomes solid with probability `density`. The same
/// seed always produces the same layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scatter {
    density: f64,
    seed: u64,
}

impl Scatter {
    /// Share of solid tiles used by the stock game.
    pub const DEFAULT_DENSITY: f64 = 0.1;

    /// Creates a scatter pass; `density` is clamped into `0.0..=1.0`.
    #[must_use]
    pub fn new(density: f64, seed: u64) -> Self {
        let density = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };
        Self { density, seed }
    }

    /// Probability that a tile becomes solid.
    #[must_use]
    pub const fn density(&self) -> f64 {
        self.density
    }

    /// Overwrites every tile of `map`, leaving the `keep_open` cells open.
    ///
    /// Returns the number of solid tiles placed.
    pub fn apply(&self, map: &mut TileMap, keep_open: &[CellCoord]) -> usize {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut placed = 0;

        for row in 0..map.height() {
            for column in 0..map.width() {
                let cell = CellCoord::new(column, row);
                let solid = rng.gen_bool(self.density) && !keep_open.contains(&cell);
                if solid {
                    placed += 1;
                    map.set_tile(cell, Tile::SOLID.with_texture(WALL_TEXTURE));
                } else {
                    map.set_tile(cell, Tile::OPEN);
                }
            }
        }

        tracing::debug!(placed, seed = self.seed, "scattered walls");
        placed
    }
}

impl Default for Scatter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DENSITY, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_produces_same_layout() {
        let mut first = TileMap::new(12, 9);
        let mut second = TileMap::new(12, 9);
        let scatter = Scatter::new(0.3, 11);

        let placed = scatter.apply(&mut first, &[]);
        assert_eq!(scatter.apply(&mut second, &[]), placed);
        assert_eq!(first, second);
    }

    #[test]
    fn keep_open_cells_stay_traversable() {
        let mut map = TileMap::new(4, 4);
        let keep = [CellCoord::new(0, 0), CellCoord::new(3, 3)];

        let placed = Scatter::new(1.0, 5).apply(&mut map, &keep);

        assert_eq!(placed, 14);
        assert!(keep.iter().all(|cell| map.is_traversable(*cell)));
        assert_eq!(
            map.tile(CellCoord::new(1, 0)).and_then(Tile::texture),
            Some(WALL_TEXTURE)
        );
    }

    #[test]
    fn density_is_clamped() {
        assert_eq!(Scatter::new(4.0, 0).density(), 1.0);
        assert_eq!(Scatter::new(-1.0, 0).density(), 0.0);
        assert_eq!(Scatter::new(f64::NAN, 0).density(), 0.0);

        let mut map = TileMap::new(3, 3);
        assert_eq!(Scatter::new(0.0, 9).apply(&mut map, &[]), 0);
    }
}
