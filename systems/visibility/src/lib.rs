#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ray-marched field of view over a tile map.
//!
//! A [`VisibilityField`] holds one flag per cell. Each [`Sweep`] fans rays
//! out of an eye position and marks every cell a ray passes through until the
//! ray leaves the map, meets a solid tile or runs out of steps. Several sweeps
//! cast without an intervening reset combine by logical OR.

use glam::Vec2;
use gridchase_core::{CellCoord, CellPoint, Grid};
use gridchase_map::TileMap;

/// Angular width of a full sweep, in degrees.
const FULL_CIRCLE: f32 = 360.0;

/// Finest angle between neighbouring rays, in degrees.
const MIN_STEP: f32 = 0.125;

/// Per-cell visibility flags, recomputed from scratch every tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityField {
    flags: Grid<bool>,
}

impl VisibilityField {
    /// Creates a field with every cell hidden.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            flags: Grid::new(width, height, false),
        }
    }

    /// Creates a field sized to `map`.
    #[must_use]
    pub fn for_map(map: &TileMap) -> Self {
        Self::new(map.width(), map.height())
    }

    /// Hides every cell.
    pub fn reset(&mut self) {
        self.flags.fill(false);
    }

    /// Reports whether the cell is visible; cells off the field never are.
    #[must_use]
    pub fn is_visible(&self, cell: CellCoord) -> bool {
        self.flags.get(cell).copied().unwrap_or(false)
    }

    /// Number of visible cells.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.flags.cells().iter().filter(|visible| **visible).count()
    }

    /// Read-only access to the flags.
    #[must_use]
    pub fn grid(&self) -> &Grid<bool> {
        &self.flags
    }

    /// Marks every cell reached by the rays of `sweep`, keeping earlier marks.
    pub fn cast(&mut self, map: &TileMap, sweep: &Sweep) {
        if sweep.radius <= 0 {
            return;
        }

        for angle in sweep.angles() {
            let radians = angle.to_radians();
            let direction = Vec2::new(radians.cos(), radians.sin());
            self.march(map, sweep, direction);
        }
    }

    /// Resets the field and casts every sweep, returning the visible count.
    pub fn recompute<I>(&mut self, map: &TileMap, sweeps: I) -> usize
    where
        I: IntoIterator<Item = Sweep>,
    {
        self.reset();
        let mut sources = 0_usize;
        for sweep in sweeps {
            sources += 1;
            self.cast(map, &sweep);
        }

        let visible = self.visible_count();
        tracing::trace!(sources, visible, "visibility recomputed");
        visible
    }

    fn march(&mut self, map: &TileMap, sweep: &Sweep, direction: Vec2) {
        let mut point = sweep.origin;
        for _ in 0..sweep.radius {
            let Some(cell) = cell_at(map, point) else {
                return;
            };

            if map.is_solid(cell) {
                if sweep.boundary == Boundary::Inclusive {
                    self.mark(cell);
                }
                return;
            }

            self.mark(cell);
            point += direction;
        }
    }

    fn mark(&mut self, cell: CellCoord) {
        if let Some(flag) = self.flags.get_mut(cell) {
            *flag = true;
        }
    }
}

/// Angular extent of a sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Arc {
    /// Rays from `heading - fov / 2` up to, but excluding, `heading + fov / 2`.
    Cone {
        /// Centre of the cone in degrees, clockwise from east in screen space.
        heading: f32,
        /// Width of the cone in degrees.
        fov: f32,
    },
    /// Rays all the way round.
    Full,
}

/// Whether the solid tile that stops a ray is itself visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// The blocking tile stays hidden.
    #[default]
    Exclusive,
    /// The blocking tile is marked before the ray stops.
    Inclusive,
}

/// Fan of rays cast from a single eye.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sweep {
    origin: Vec2,
    arc: Arc,
    radius: i32,
    step_degrees: f32,
    boundary: Boundary,
}

impl Sweep {
    /// Angle between neighbouring rays unless overridden.
    pub const DEFAULT_STEP: f32 = 2.0;

    /// Cone of rays centred on `heading`.
    #[must_use]
    pub fn cone(origin: Vec2, heading: f32, fov: f32, radius: i32) -> Self {
        Self::with_arc(origin, Arc::Cone { heading, fov }, radius)
    }

    /// Rays in every direction.
    #[must_use]
    pub fn full(origin: Vec2, radius: i32) -> Self {
        Self::with_arc(origin, Arc::Full, radius)
    }

    fn with_arc(origin: Vec2, arc: Arc, radius: i32) -> Self {
        Self {
            origin,
            arc,
            radius,
            step_degrees: Self::DEFAULT_STEP,
            boundary: Boundary::default(),
        }
    }

    /// Returns the sweep with a different angle between rays.
    ///
    /// Positive steps finer than an eighth of a degree are coarsened to that.
    #[must_use]
    pub fn with_step(mut self, step_degrees: f32) -> Self {
        self.step_degrees = step_degrees;
        self
    }

    /// Returns the sweep with a different blocking rule.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Eye position measured in cells.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Angular extent of the sweep.
    #[must_use]
    pub const fn arc(&self) -> Arc {
        self.arc
    }

    /// Maximum number of cells a ray visits.
    #[must_use]
    pub const fn radius(&self) -> i32 {
        self.radius
    }

    fn angles(&self) -> impl Iterator<Item = f32> {
        let (start, span) = match self.arc {
            Arc::Cone { heading, fov } => {
                let span = fov.min(FULL_CIRCLE);
                (heading - span / 2.0, span)
            }
            Arc::Full => (0.0, FULL_CIRCLE),
        };

        let step = self.step_degrees.max(MIN_STEP);
        let count = if self.step_degrees > 0.0 && span > 0.0 && span.is_finite() {
            (span / step).ceil() as u32
        } else {
            0
        };
        (0..count).map(move |index| start + index as f32 * step)
    }
}

/// Stationary visibility source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sentry {
    position: Vec2,
    heading: f32,
    fov: f32,
    radius: i32,
}

impl Sentry {
    /// Cone width used by stock sentries, in degrees.
    pub const DEFAULT_FOV: f32 = 100.0;
    /// Ray length used by stock sentries, in cells.
    pub const DEFAULT_RADIUS: i32 = 10;

    /// Creates a sentry looking along `heading`.
    #[must_use]
    pub fn new(position: CellPoint, heading: f32, fov: f32, radius: i32) -> Self {
        Self {
            position: Vec2::new(position.column(), position.row()),
            heading,
            fov,
            radius,
        }
    }

    /// Creates a sentry with the stock cone width and range.
    #[must_use]
    pub fn standard(position: CellPoint, heading: f32) -> Self {
        Self::new(position, heading, Self::DEFAULT_FOV, Self::DEFAULT_RADIUS)
    }

    /// Eye position measured in cells.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Facing in degrees.
    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.heading
    }

    /// Rays cast by the sentry.
    #[must_use]
    pub fn sweep(&self) -> Sweep {
        Sweep::cone(self.position, self.heading, self.fov, self.radius)
    }
}

fn cell_at(map: &TileMap, point: Vec2) -> Option<CellCoord> {
    let (column, row) = (point.x.floor(), point.y.floor());
    let inside = column >= 0.0
        && row >= 0.0
        && column < map.width() as f32
        && row < map.height() as f32;
    inside.then(|| CellCoord::new(column as u32, row as u32))
}
