//! Interpolated travel along a queue of cells.

use std::time::Duration;

use glam::Vec2;
use gridchase_core::{CellCoord, Path};
use gridchase_map::TileMap;

use crate::{MotionError, MotionEvent};

/// Coarse phase of a [`Mover`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionState {
    /// Resting on a cell with nothing queued.
    Idle,
    /// Travelling between two cells.
    Transiting,
    /// Resting with a destination waiting to be resolved.
    PathPending,
}

/// Body that travels cell to cell along a path at a constant speed.
///
/// The continuous position is never stored; it is derived from the cell last
/// departed, the cell being approached and the time already spent on the
/// leg. Leg time is kept in whole nanoseconds against a leg period fixed by
/// the speed, so splitting a `dt` into shorter ticks never changes where the
/// mover ends up. Destination requests are latched and only resolved while the mover rests
/// on a cell, so a leg is never abandoned halfway.
#[derive(Clone, Debug, PartialEq)]
pub struct Mover {
    prev: CellCoord,
    target: CellCoord,
    path: Option<Path>,
    pending: Option<CellCoord>,
    elapsed: Duration,
    leg: Option<Duration>,
    speed: f32,
}

impl Mover {
    /// Creates a mover resting on `cell` that travels `speed` cells per second.
    ///
    /// Negative or NaN speeds are treated as zero.
    #[must_use]
    pub fn new(cell: CellCoord, speed: f32) -> Self {
        Self {
            prev: cell,
            target: cell,
            path: None,
            pending: None,
            elapsed: Duration::ZERO,
            leg: leg_period(speed),
            speed: sanitize_speed(speed),
        }
    }

    /// Cell most recently departed, or the resting cell when idle.
    #[must_use]
    pub const fn prev(&self) -> CellCoord {
        self.prev
    }

    /// Cell currently being approached; equals [`Mover::prev`] when idle.
    #[must_use]
    pub const fn target(&self) -> CellCoord {
        self.target
    }

    /// Remaining path, headed by [`Mover::target`].
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Latched destination awaiting resolution.
    #[must_use]
    pub const fn pending(&self) -> Option<CellCoord> {
        self.pending
    }

    /// Fraction of the current leg already covered, in `0.0..1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        let Some(leg) = self.leg else {
            return 0.0;
        };
        let covered = self.elapsed.as_nanos() as f64 / leg.as_nanos() as f64;
        covered.min(1.0) as f32
    }

    /// Time already spent on the current leg.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Travel speed in cells per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Changes the travel speed; negative or NaN speeds are treated as zero.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = sanitize_speed(speed);
        self.leg = leg_period(speed);
    }

    /// Coarse phase derived from the queued path and latched request.
    #[must_use]
    pub fn state(&self) -> MotionState {
        match (&self.path, self.pending) {
            (Some(_), _) => MotionState::Transiting,
            (None, Some(_)) => MotionState::PathPending,
            (None, None) => MotionState::Idle,
        }
    }

    /// Reports whether the mover rests with nothing queued.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state() == MotionState::Idle
    }

    /// Latches a destination, replacing any earlier unresolved request.
    pub fn set_destination(&mut self, cell: CellCoord) {
        self.pending = Some(cell);
    }

    /// Installs `path` immediately, discarding any latched request.
    ///
    /// A leading cell equal to the resting cell is dropped and an empty path
    /// simply brings the mover to rest. The path is rejected while a leg is
    /// partly covered, and when its first cell is not adjacent to the resting
    /// cell.
    pub fn assign_path(&mut self, mut path: Path, map: &TileMap) -> Result<(), MotionError> {
        if self.path.is_some() && !self.elapsed.is_zero() {
            return Err(MotionError::InTransit);
        }

        let _ = path.strip_leading(self.prev);
        let Some(first) = path.first() else {
            self.pending = None;
            self.rest();
            return Ok(());
        };

        if !map.adjacent(self.prev, first) {
            return Err(MotionError::Detached {
                from: self.prev,
                to: first,
            });
        }

        self.pending = None;
        self.target = first;
        self.path = Some(path);
        Ok(())
    }

    /// Advances the mover by `dt`, reporting legs completed and paths resolved.
    ///
    /// A latched destination is resolved first when the mover rests on a
    /// cell. Time then accrues on the current leg; every time a whole leg is
    /// covered the mover commits to the next cell, so a long `dt` may cross
    /// several cells in one call.
    pub fn advance(&mut self, map: &TileMap, dt: Duration, out: &mut Vec<MotionEvent>) {
        if self.path.is_none() && self.pending.is_some() {
            self.resolve_pending(map, out);
        }

        let Some(leg) = self.leg else {
            return;
        };
        if self.path.is_none() {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        while self.elapsed >= leg && self.path.is_some() {
            self.elapsed -= leg;
            self.commit_leg(map, out);
        }
    }

    /// Continuous position measured in cells.
    ///
    /// A leg across a wrapped edge is drawn as a unit hop out of the departed
    /// cell rather than a sweep across the whole map, so coordinates may dip
    /// just below zero or past the map width during such a leg.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        let column = unit_step(self.prev.column(), self.target.column());
        let row = unit_step(self.prev.row(), self.target.row());
        let progress = self.progress();
        Vec2::new(
            self.prev.column() as f32 + column * progress,
            self.prev.row() as f32 + row * progress,
        )
    }

    fn commit_leg(&mut self, map: &TileMap, out: &mut Vec<MotionEvent>) {
        let from = self.prev;
        self.prev = self.target;
        out.push(MotionEvent::Stepped {
            from,
            to: self.prev,
        });

        if let Some(path) = self.path.as_mut() {
            let _ = path.pop_front();
        }

        if self.pending.is_some() {
            self.resolve_pending(map, out);
            return;
        }

        match self.path.as_ref().and_then(Path::first) {
            Some(next) => self.target = next,
            None => {
                self.rest();
                out.push(MotionEvent::Halted { cell: self.prev });
            }
        }
    }

    fn resolve_pending(&mut self, map: &TileMap, out: &mut Vec<MotionEvent>) {
        let Some(requested) = self.pending.take() else {
            return;
        };

        let resolved = map.path(self.prev, requested).and_then(|mut path| {
            let _ = path.strip_leading(self.prev);
            (!path.is_empty()).then_some(path)
        });

        match resolved {
            Some(path) => {
                if let (Some(first), Some(destination)) = (path.first(), path.last()) {
                    self.target = first;
                    out.push(MotionEvent::PathAssigned {
                        destination,
                        length: path.len(),
                    });
                }
                self.path = Some(path);
            }
            None => {
                let was_moving = self.path.is_some();
                self.rest();
                if map.resolve_destination(requested) != Some(self.prev) {
                    tracing::trace!(?requested, cell = ?self.prev, "destination unreachable");
                    out.push(MotionEvent::PathUnavailable { requested });
                }
                if was_moving {
                    out.push(MotionEvent::Halted { cell: self.prev });
                }
            }
        }
    }

    fn rest(&mut self) {
        self.path = None;
        self.target = self.prev;
        self.elapsed = Duration::ZERO;
    }
}

fn sanitize_speed(speed: f32) -> f32 {
    if speed.is_finite() {
        speed.max(0.0)
    } else {
        0.0
    }
}

/// Time needed to cover one leg, or `None` when the mover cannot move.
fn leg_period(speed: f32) -> Option<Duration> {
    let speed = sanitize_speed(speed);
    if speed == 0.0 {
        return None;
    }
    let nanos = (1e9 / f64::from(speed)).round();
    Some(Duration::from_nanos((nanos as u64).max(1)))
}

/// Signed unit step from `from` to `to` on one axis; a jump longer than one
/// cell is a wrapped step and points the other way.
fn unit_step(from: u32, to: u32) -> f32 {
    let delta = i64::from(to) - i64::from(from);
    let step = if delta.abs() > 1 {
        -delta.signum()
    } else {
        delta
    };
    step as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_mover_rests_on_its_cell() {
        let mover = Mover::new(CellCoord::new(2, 3), 4.0);
        assert_eq!(mover.state(), MotionState::Idle);
        assert_eq!(mover.prev(), mover.target());
        assert_eq!(mover.position(), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn unit_step_flips_wrapped_jumps() {
        assert_eq!(unit_step(3, 4), 1.0);
        assert_eq!(unit_step(4, 3), -1.0);
        assert_eq!(unit_step(4, 4), 0.0);
        assert_eq!(unit_step(9, 0), 1.0);
        assert_eq!(unit_step(0, 9), -1.0);
    }

    #[test]
    fn invalid_speeds_are_zeroed() {
        assert_eq!(Mover::new(CellCoord::new(0, 0), -2.0).speed(), 0.0);
        assert_eq!(Mover::new(CellCoord::new(0, 0), f32::NAN).speed(), 0.0);
        let mut mover = Mover::new(CellCoord::new(0, 0), 1.0);
        mover.set_speed(f32::INFINITY);
        assert_eq!(mover.speed(), 0.0);
    }

    #[test]
    fn leg_period_is_whole_nanoseconds() {
        assert_eq!(leg_period(5.0), Some(Duration::from_millis(200)));
        assert_eq!(leg_period(3.0), Some(Duration::from_nanos(333_333_333)));
        assert_eq!(leg_period(0.0), None);
        assert_eq!(leg_period(f32::NAN), None);
        assert_eq!(leg_period(f32::MAX), Some(Duration::from_nanos(1)));
    }

    #[test]
    fn stationary_mover_still_resolves_requests() {
        let map = TileMap::new(4, 1);
        let mut mover = Mover::new(CellCoord::new(0, 0), 0.0);
        mover.set_destination(CellCoord::new(3, 0));
        let mut events = Vec::new();
        mover.advance(&map, Duration::from_secs(10), &mut events);

        assert_eq!(mover.state(), MotionState::Transiting);
        assert_eq!(mover.elapsed(), Duration::ZERO);
        assert_eq!(mover.prev(), CellCoord::new(0, 0));
    }

    #[test]
    fn latched_destination_reports_pending_state() {
        let mut mover = Mover::new(CellCoord::new(0, 0), 1.0);
        mover.set_destination(CellCoord::new(3, 0));
        assert_eq!(mover.state(), MotionState::PathPending);
        assert_eq!(mover.pending(), Some(CellCoord::new(3, 0)));
    }

    #[test]
    fn assign_path_rejects_detached_paths() {
        let map = TileMap::new(4, 4);
        let mut mover = Mover::new(CellCoord::new(0, 0), 1.0);
        let error = mover
            .assign_path(Path::from(vec![CellCoord::new(2, 2)]), &map)
            .expect_err("detached");
        assert_eq!(
            error,
            MotionError::Detached {
                from: CellCoord::new(0, 0),
                to: CellCoord::new(2, 2),
            }
        );
        assert!(mover.is_idle());
    }

    #[test]
    fn assign_path_rejects_partly_covered_legs() {
        let map = TileMap::new(4, 1);
        let mut mover = Mover::new(CellCoord::new(0, 0), 2.0);
        mover
            .assign_path(Path::from(vec![CellCoord::new(1, 0)]), &map)
            .expect("adjacent path");
        let mut events = Vec::new();
        mover.advance(&map, Duration::from_millis(250), &mut events);

        let error = mover
            .assign_path(Path::from(vec![CellCoord::new(1, 0)]), &map)
            .expect_err("mid-leg");
        assert_eq!(error, MotionError::InTransit);
    }

    #[test]
    fn assign_path_drops_leading_resting_cell() {
        let map = TileMap::new(4, 1);
        let mut mover = Mover::new(CellCoord::new(1, 0), 1.0);
        mover
            .assign_path(
                Path::from(vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]),
                &map,
            )
            .expect("path starting at resting cell");
        assert_eq!(mover.target(), CellCoord::new(2, 0));
        assert_eq!(mover.path().map(Path::len), Some(1));
    }
}
