#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tile map and the path queries it answers.
//!
//! [`TileMap`] owns the tile grid together with the topology (bounded or
//! toroidal) and the neighbourhood (four or eight cells) that define which
//! cells are adjacent. Path queries never mutate the map; every search works
//! on scratch buffers that are dropped when the query returns.

use gridchase_core::{CellCoord, Grid, Neighborhood, Path, TextureId, Tile, Topology};

mod generation;
mod layout;
mod navigation;

pub use generation::Scatter;
pub use layout::LayoutError;

/// Texture assigned to walls produced by [`Scatter`] and layout parsing.
pub const WALL_TEXTURE: TextureId = TextureId::new(0);

/// Grid of tiles plus the adjacency rules used by movement and search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    tiles: Grid<Tile>,
    topology: Topology,
    neighborhood: Neighborhood,
}

impl TileMap {
    /// Creates a bounded, four-connected map of open tiles.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_tiles(Grid::new(width, height, Tile::OPEN))
    }

    /// Wraps an already populated tile grid.
    #[must_use]
    pub fn from_tiles(tiles: Grid<Tile>) -> Self {
        Self {
            tiles,
            topology: Topology::Bounded,
            neighborhood: Neighborhood::Cardinal,
        }
    }

    /// Returns the map with the provided edge behaviour.
    #[must_use]
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Returns the map with the provided adjacency rule.
    #[must_use]
    pub fn with_neighborhood(mut self, neighborhood: Neighborhood) -> Self {
        self.neighborhood = neighborhood;
        self
    }

    /// Number of tile columns.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.tiles.width()
    }

    /// Number of tile rows.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.tiles.height()
    }

    /// Edge behaviour of the map.
    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Adjacency rule of the map.
    #[must_use]
    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    /// Read-only access to the tile grid.
    #[must_use]
    pub fn tiles(&self) -> &Grid<Tile> {
        &self.tiles
    }

    /// Tile stored at the cell, if the cell lies on the map.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.tiles.get(cell)
    }

    /// Replaces the tile at the cell.
    ///
    /// # Panics
    ///
    /// Panics when the cell lies outside the map.
    pub fn set_tile(&mut self, cell: CellCoord, tile: Tile) {
        self.tiles.set(cell, tile);
    }

    /// Changes only the solidity of the tile at the cell.
    ///
    /// # Panics
    ///
    /// Panics when the cell lies outside the map.
    pub fn set_solid(&mut self, cell: CellCoord, solid: bool) {
        let tile = self.tiles[cell];
        self.tiles.set(cell, tile.with_solid(solid));
    }

    /// Reports whether the cell lies on the map.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.tiles.contains(cell)
    }

    /// Reports whether the tile at the cell is solid. Cells off the map are not.
    #[must_use]
    pub fn is_solid(&self, cell: CellCoord) -> bool {
        self.tiles.get(cell).is_some_and(Tile::is_solid)
    }

    /// Reports whether the cell lies on the map and is not solid.
    #[must_use]
    pub fn is_traversable(&self, cell: CellCoord) -> bool {
        self.tiles.get(cell).is_some_and(|tile| !tile.is_solid())
    }

    /// Cells adjacent to `cell` under the map's neighbourhood and topology.
    ///
    /// Solid cells are included; callers filter by traversability.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        neighbors_of(
            cell,
            self.width(),
            self.height(),
            self.topology,
            self.neighborhood,
        )
    }

    /// Reports whether `to` is one step away from `from`.
    #[must_use]
    pub fn adjacent(&self, from: CellCoord, to: CellCoord) -> bool {
        from != to && self.neighbors(from).any(|neighbor| neighbor == to)
    }

    /// Step distance between two cells ignoring tiles.
    ///
    /// Cardinal maps measure Manhattan distance, octile maps Chebyshev
    /// distance; toroidal maps measure each axis the short way round.
    #[must_use]
    pub fn distance(&self, from: CellCoord, to: CellCoord) -> u32 {
        let columns = self
            .topology
            .axis_distance(from.column(), to.column(), self.width());
        let rows = self
            .topology
            .axis_distance(from.row(), to.row(), self.height());
        match self.neighborhood {
            Neighborhood::Cardinal => columns + rows,
            Neighborhood::Octile => columns.max(rows),
        }
    }

    /// Manhattan distance between two continuous points, wrapped on toroidal maps.
    #[must_use]
    pub fn point_distance(&self, from: (f32, f32), to: (f32, f32)) -> f32 {
        let width = self.width() as f32;
        let height = self.height() as f32;
        self.topology.axis_span(from.0, to.0, width) + self.topology.axis_span(from.1, to.1, height)
    }

    /// Clamps signed coordinates onto the map.
    #[must_use]
    pub fn clamp(&self, column: i64, row: i64) -> Option<CellCoord> {
        CellCoord::clamped(column, row, self.width(), self.height())
    }

    /// Resolves a requested goal into the cell a search will actually target.
    ///
    /// The goal is clamped onto the map; a solid result is relocated to the
    /// nearest open cell by a bounded breadth-first expansion. Returns `None`
    /// when the map has no open cells.
    #[must_use]
    pub fn resolve_destination(&self, goal: CellCoord) -> Option<CellCoord> {
        let clamped = self.clamp(i64::from(goal.column()), i64::from(goal.row()))?;
        let resolved = navigation::nearest_open(self, clamped);
        match resolved {
            Some(cell) if cell != clamped => {
                tracing::debug!(?goal, ?cell, "relocated blocked destination");
            }
            None => tracing::debug!(?goal, "no open cell to relocate destination to"),
            _ => {}
        }
        resolved
    }

    /// Computes a shortest path from `start` towards `goal`.
    ///
    /// The returned path excludes `start` and ends at the resolved
    /// destination. Returns `None` when `start` lies off the map, when the
    /// destination resolves to `start`, or when no path exists.
    #[must_use]
    pub fn path(&self, start: CellCoord, goal: CellCoord) -> Option<Path> {
        if !self.contains(start) {
            tracing::debug!(?start, "path requested from a cell off the map");
            return None;
        }

        let destination = self.resolve_destination(goal)?;
        if destination == start {
            return None;
        }

        let path = navigation::find_path(self, start, destination);
        if path.is_none() {
            tracing::debug!(?start, ?destination, "destination unreachable");
        }
        path
    }

    /// Same as [`TileMap::path`] for goals expressed in signed coordinates.
    #[must_use]
    pub fn path_towards(&self, start: CellCoord, column: i64, row: i64) -> Option<Path> {
        let goal = self.clamp(column, row)?;
        self.path(start, goal)
    }
}

pub(crate) fn neighbors_of(
    cell: CellCoord,
    width: u32,
    height: u32,
    topology: Topology,
    neighborhood: Neighborhood,
) -> impl Iterator<Item = CellCoord> {
    neighborhood
        .offsets()
        .iter()
        .filter_map(move |&(column_delta, row_delta)| {
            let column = topology.step(cell.column(), column_delta, width)?;
            let row = topology.step(cell.row(), row_delta, height)?;
            let neighbor = CellCoord::new(column, row);
            (neighbor != cell).then_some(neighbor)
        })
}
