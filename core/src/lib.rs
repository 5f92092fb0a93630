#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Chase engine.
//!
//! This crate defines the vocabulary that connects the driver, the
//! authoritative world, and the pure systems. Drivers submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! what changed. The grid container, cell coordinates, tiles and paths live
//! here so every crate agrees on a single data model.

use std::{collections::VecDeque, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod grid;

pub use grid::{Grid, GridError};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Adds a new actor resting on the provided cell.
    SpawnActor {
        /// Targeting behaviour assigned to the actor.
        role: Role,
        /// Cell the actor starts on.
        cell: CellCoord,
        /// Travel speed measured in cells per second.
        speed: f32,
    },
    /// Latches a destination that the actor resolves at its next opportunity.
    SetDestination {
        /// Actor receiving the request.
        actor: ActorId,
        /// Requested destination; clamped and relocated by the pathfinder.
        cell: CellCoord,
    },
    /// Installs a precomputed path on a resting actor.
    AssignPath {
        /// Actor receiving the path.
        actor: ActorId,
        /// Cells to visit, excluding the actor's resting cell.
        path: Path,
    },
    /// Toggles whether a tile blocks movement and sight.
    SetTile {
        /// Tile being changed.
        cell: CellCoord,
        /// Whether the tile becomes solid.
        solid: bool,
    },
    /// Places a stationary visibility source.
    PlaceSentry {
        /// Eye position measured in cells; may be fractional.
        position: CellPoint,
        /// Facing measured in degrees, clockwise from east in screen space.
        heading: f32,
        /// Width of the view cone in degrees.
        fov: f32,
        /// Number of ray steps marched from the eye.
        radius: i32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an actor joined the world.
    ActorSpawned {
        /// Identifier allocated to the actor.
        actor: ActorId,
        /// Targeting behaviour of the actor.
        role: Role,
        /// Cell the actor rests on.
        cell: CellCoord,
    },
    /// Confirms that an actor completed a single-cell leg.
    ActorStepped {
        /// Actor that moved.
        actor: ActorId,
        /// Cell the leg departed from.
        from: CellCoord,
        /// Cell the leg arrived at.
        to: CellCoord,
    },
    /// Reports that a destination request was resolved into a path.
    PathAssigned {
        /// Actor following the path.
        actor: ActorId,
        /// Final cell of the path after destination resolution.
        destination: CellCoord,
        /// Number of cells in the path.
        length: usize,
    },
    /// Reports that a destination request could not be reached.
    PathUnavailable {
        /// Actor whose request failed.
        actor: ActorId,
        /// Cell originally requested.
        requested: CellCoord,
    },
    /// Reports that an actor came to rest after its path ran out.
    ActorHalted {
        /// Actor that stopped.
        actor: ActorId,
        /// Cell the actor rests on.
        cell: CellCoord,
    },
    /// Confirms that a tile changed solidity.
    TileChanged {
        /// Tile that changed.
        cell: CellCoord,
        /// New solidity of the tile.
        solid: bool,
    },
    /// Confirms that a sentry was placed.
    SentryPlaced {
        /// Identifier allocated to the sentry.
        sentry: SentryId,
    },
    /// Reports the outcome of the per-tick visibility recomputation.
    VisibilityRecomputed {
        /// Number of cells visible to at least one sentry.
        visible: usize,
    },
    /// Reports that a command could not be applied.
    CommandRejected {
        /// Specific reason the command failed.
        reason: CommandError,
    },
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandError {
    /// No actor with the provided identifier exists.
    #[error("actor {0:?} does not exist")]
    UnknownActor(ActorId),
    /// The referenced cell lies outside the map.
    #[error("cell ({}, {}) lies outside the map", .0.column(), .0.row())]
    OutOfBounds(CellCoord),
    /// The referenced cell is solid.
    #[error("cell ({}, {}) is solid", .0.column(), .0.row())]
    Blocked(CellCoord),
    /// A path cannot replace the current one while a leg is underway.
    #[error("actor {0:?} is between cells")]
    InTransit(ActorId),
    /// The path does not begin next to the actor's resting cell.
    #[error("path for actor {actor:?} does not start next to its cell")]
    Detached {
        /// Actor the path was meant for.
        actor: ActorId,
    },
    /// Speed must be a finite, non-negative number.
    #[error("speed must be finite and non-negative")]
    InvalidSpeed,
    /// Sentry position, heading and cone width must be finite, and the cone
    /// width non-negative.
    #[error("sentry placement must use finite coordinates and angles")]
    InvalidSentry,
}

/// Targeting behaviour assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Chases the nearest evader or directed actor whenever it comes to rest.
    Pursuer,
    /// Chases the nearest evader or directed actor, re-targeting every tick.
    Hunter,
    /// Flees from the nearest pursuer or hunter whenever it comes to rest.
    Evader,
    /// Moves only towards destinations requested through commands.
    Directed,
}

impl Role {
    /// Reports whether an actor with this role tracks actors with `other`'s role.
    #[must_use]
    pub const fn regards(self, other: Role) -> bool {
        match self {
            Self::Pursuer | Self::Hunter => matches!(other, Self::Evader | Self::Directed),
            Self::Evader => matches!(other, Self::Pursuer | Self::Hunter),
            Self::Directed => false,
        }
    }
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a sentry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SentryId(u32);

impl SentryId {
    /// Creates a new sentry identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Clamps signed coordinates into a `columns` by `rows` grid.
    ///
    /// Returns `None` when the grid has no cells.
    #[must_use]
    pub fn clamped(column: i64, row: i64, columns: u32, rows: u32) -> Option<Self> {
        if columns == 0 || rows == 0 {
            return None;
        }

        let clamp = |value: i64, extent: u32| -> u32 {
            let upper = i64::from(extent) - 1;
            u32::try_from(value.clamp(0, upper)).unwrap_or(0)
        };

        Some(Self::new(clamp(column, columns), clamp(row, rows)))
    }
}

/// Continuous location measured in cells, used for eyes and interpolated bodies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellPoint {
    column: f32,
    row: f32,
}

impl CellPoint {
    /// Creates a new continuous point.
    #[must_use]
    pub const fn new(column: f32, row: f32) -> Self {
        Self { column, row }
    }

    /// Horizontal coordinate measured in cells.
    #[must_use]
    pub const fn column(&self) -> f32 {
        self.column
    }

    /// Vertical coordinate measured in cells.
    #[must_use]
    pub const fn row(&self) -> f32 {
        self.row
    }
}

/// Edge behaviour of a map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Edges are walls; coordinates never leave the map.
    #[default]
    Bounded,
    /// Opposite edges connect, so each axis is circular.
    Toroidal,
}

impl Topology {
    /// Distance between two coordinates on an axis of `extent` cells.
    #[must_use]
    pub fn axis_distance(self, from: u32, to: u32, extent: u32) -> u32 {
        let direct = from.abs_diff(to);
        match self {
            Self::Bounded => direct,
            Self::Toroidal => direct.min(extent.saturating_sub(direct)),
        }
    }

    /// Continuous counterpart of [`Topology::axis_distance`].
    #[must_use]
    pub fn axis_span(self, from: f32, to: f32, extent: f32) -> f32 {
        let direct = (from - to).abs();
        match self {
            Self::Bounded => direct,
            Self::Toroidal => direct.min(extent - direct),
        }
    }

    /// Offsets `value` by `delta` on an axis of `extent` cells.
    ///
    /// Bounded axes reject results that leave the map; toroidal axes wrap.
    #[must_use]
    pub fn step(self, value: u32, delta: i32, extent: u32) -> Option<u32> {
        if extent == 0 {
            return None;
        }

        match self {
            Self::Bounded => value
                .checked_add_signed(delta)
                .filter(|stepped| *stepped < extent),
            Self::Toroidal => {
                let wrapped = (i64::from(value) + i64::from(delta)).rem_euclid(i64::from(extent));
                u32::try_from(wrapped).ok()
            }
        }
    }
}

/// Set of cells considered adjacent to a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    /// North, east, south and west.
    #[default]
    Cardinal,
    /// Cardinal cells plus the four diagonals.
    Octile,
}

const CARDINAL_OFFSETS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const OCTILE_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

impl Neighborhood {
    /// Column and row offsets of adjacent cells, clockwise from north.
    #[must_use]
    pub const fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Self::Cardinal => &CARDINAL_OFFSETS,
            Self::Octile => &OCTILE_OFFSETS,
        }
    }
}

/// Identifier of the texture a renderer draws for a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(u16);

impl TextureId {
    /// Creates a texture identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Single map tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    solid: bool,
    pellet: bool,
    texture: Option<TextureId>,
}

impl Tile {
    /// Traversable tile without decoration.
    pub const OPEN: Tile = Tile {
        solid: false,
        pellet: false,
        texture: None,
    };

    /// Solid tile without decoration.
    pub const SOLID: Tile = Tile {
        solid: true,
        pellet: false,
        texture: None,
    };

    /// Returns a copy carrying the provided texture.
    #[must_use]
    pub const fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Returns a copy carrying a pellet.
    #[must_use]
    pub const fn with_pellet(mut self) -> Self {
        self.pellet = true;
        self
    }

    /// Returns a copy with the provided solidity.
    #[must_use]
    pub const fn with_solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    /// Whether the tile blocks movement and sight.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        self.solid
    }

    /// Whether the tile holds a pellet.
    #[must_use]
    pub const fn has_pellet(&self) -> bool {
        self.pellet
    }

    /// Texture a renderer should draw, if any.
    #[must_use]
    pub const fn texture(&self) -> Option<TextureId> {
        self.texture
    }
}

/// Ordered cells leading away from a start cell, start excluded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    cells: VecDeque<CellCoord>,
}

impl Path {
    /// Number of cells left to visit.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cells are left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Next cell to visit.
    #[must_use]
    pub fn first(&self) -> Option<CellCoord> {
        self.cells.front().copied()
    }

    /// Final cell of the path.
    #[must_use]
    pub fn last(&self) -> Option<CellCoord> {
        self.cells.back().copied()
    }

    /// Removes and returns the next cell.
    pub fn pop_front(&mut self) -> Option<CellCoord> {
        self.cells.pop_front()
    }

    /// Drops the leading cell when it equals `cell`, reporting whether it did.
    pub fn strip_leading(&mut self, cell: CellCoord) -> bool {
        if self.first() == Some(cell) {
            let _ = self.cells.pop_front();
            true
        } else {
            false
        }
    }

    /// Reports whether the path visits `cell`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Iterates over the remaining cells in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }
}

impl From<Vec<CellCoord>> for Path {
    fn from(cells: Vec<CellCoord>) -> Self {
        Self {
            cells: cells.into(),
        }
    }
}

impl FromIterator<CellCoord> for Path {
    fn from_iter<I: IntoIterator<Item = CellCoord>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, Grid, Neighborhood, Path, Role, Tile, Topology};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn clamped_pulls_coordinates_into_range() {
        assert_eq!(
            CellCoord::clamped(-3, 12, 5, 4),
            Some(CellCoord::new(0, 3))
        );
        assert_eq!(CellCoord::clamped(2, 2, 5, 4), Some(CellCoord::new(2, 2)));
        assert_eq!(CellCoord::clamped(0, 0, 0, 4), None);
    }

    #[test]
    fn toroidal_axis_distance_takes_short_way_round() {
        assert_eq!(Topology::Bounded.axis_distance(0, 9, 10), 9);
        assert_eq!(Topology::Toroidal.axis_distance(0, 9, 10), 1);
        assert_eq!(Topology::Toroidal.axis_distance(2, 7, 10), 5);
        assert!((Topology::Toroidal.axis_span(0.5, 9.0, 10.0) - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn step_wraps_only_on_toroidal_axes() {
        assert_eq!(Topology::Bounded.step(0, -1, 5), None);
        assert_eq!(Topology::Bounded.step(4, 1, 5), None);
        assert_eq!(Topology::Bounded.step(3, 1, 5), Some(4));
        assert_eq!(Topology::Toroidal.step(0, -1, 5), Some(4));
        assert_eq!(Topology::Toroidal.step(4, 1, 5), Some(0));
        assert_eq!(Topology::Toroidal.step(0, 1, 0), None);
    }

    #[test]
    fn neighborhoods_list_expected_offsets() {
        assert_eq!(Neighborhood::Cardinal.offsets().len(), 4);
        assert_eq!(Neighborhood::Octile.offsets().len(), 8);
        assert_eq!(Neighborhood::Cardinal.offsets()[0], (0, -1));
    }

    #[test]
    fn strip_leading_only_removes_matching_head() {
        let mut path = Path::from(vec![CellCoord::new(0, 0), CellCoord::new(1, 0)]);
        assert!(!path.strip_leading(CellCoord::new(1, 0)));
        assert!(path.strip_leading(CellCoord::new(0, 0)));
        assert_eq!(path.first(), Some(CellCoord::new(1, 0)));
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn roles_regard_their_counterparts() {
        assert!(Role::Pursuer.regards(Role::Evader));
        assert!(Role::Hunter.regards(Role::Directed));
        assert!(!Role::Pursuer.regards(Role::Hunter));
        assert!(Role::Evader.regards(Role::Hunter));
        assert!(!Role::Directed.regards(Role::Pursuer));
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn path_round_trips_through_bincode() {
        let path = Path::from(vec![CellCoord::new(3, 1), CellCoord::new(3, 2)]);
        assert_round_trip(&path);
    }

    #[test]
    fn tile_grid_round_trips_through_bincode() {
        let grid = Grid::from_fn(3, 2, |cell| Tile::OPEN.with_solid(cell.column() == 1));
        assert_round_trip(&grid);
    }
}
