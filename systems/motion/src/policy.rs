//! Targeting policies that pick destinations for actors.

use std::fmt::Debug;

use glam::Vec2;
use gridchase_core::{ActorId, CellCoord, Path, Role, Topology};
use gridchase_map::TileMap;

use crate::Mover;

/// Another actor as seen by a policy at the start of a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Identifier of the observed actor.
    pub id: ActorId,
    /// Cell the observed actor last rested on.
    pub cell: CellCoord,
    /// Continuous position of the observed actor.
    pub position: Vec2,
}

/// Decides where an actor should head next.
///
/// Policies run once per tick before the mover advances. Returning a cell
/// latches it as the mover's destination; `None` leaves the mover alone.
pub trait TargetingPolicy: Debug {
    /// Picks a destination given the mover and the actors it regards.
    fn choose(
        &mut self,
        mover: &Mover,
        candidates: &[Candidate],
        map: &TileMap,
    ) -> Option<CellCoord>;

    /// Actor the policy is currently reacting to.
    fn focus(&self) -> Option<ActorId> {
        None
    }
}

/// How often a chasing policy revisits its choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Retarget {
    /// Only once the previous chase has come to rest.
    #[default]
    WhenIdle,
    /// Every tick; the new request takes over when the current leg ends.
    EveryTick,
}

/// Heads for the resting cell of the nearest candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChaseNearest {
    retarget: Retarget,
    quarry: Option<ActorId>,
}

impl ChaseNearest {
    /// Creates a chasing policy with the provided retarget cadence.
    #[must_use]
    pub const fn new(retarget: Retarget) -> Self {
        Self {
            retarget,
            quarry: None,
        }
    }

    /// Retarget cadence of the policy.
    #[must_use]
    pub const fn retarget(&self) -> Retarget {
        self.retarget
    }
}

impl TargetingPolicy for ChaseNearest {
    fn choose(
        &mut self,
        mover: &Mover,
        candidates: &[Candidate],
        map: &TileMap,
    ) -> Option<CellCoord> {
        if self.retarget == Retarget::WhenIdle && !mover.is_idle() {
            return None;
        }

        let nearest = nearest(mover.position(), candidates, map)?;
        self.quarry = Some(nearest.id);

        let heading_there = mover.path().and_then(Path::last) == Some(nearest.cell);
        if heading_there || nearest.cell == mover.prev() {
            return None;
        }
        Some(nearest.cell)
    }

    fn focus(&self) -> Option<ActorId> {
        self.quarry
    }
}

/// Runs to the part of the map farthest from the nearest candidate.
///
/// On toroidal maps the refuge is the cell half a map away on both axes; on
/// bounded maps it is the corner diagonally opposite the threat's quadrant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FleeNearest {
    threat: Option<ActorId>,
}

impl FleeNearest {
    /// Creates a fleeing policy.
    #[must_use]
    pub const fn new() -> Self {
        Self { threat: None }
    }
}

impl TargetingPolicy for FleeNearest {
    fn choose(
        &mut self,
        mover: &Mover,
        candidates: &[Candidate],
        map: &TileMap,
    ) -> Option<CellCoord> {
        if !mover.is_idle() {
            return None;
        }

        let threat = nearest(mover.position(), candidates, map)?;
        self.threat = Some(threat.id);

        let refuge = refuge_from(threat.cell, map)?;
        (refuge != mover.prev()).then_some(refuge)
    }

    fn focus(&self) -> Option<ActorId> {
        self.threat
    }
}

/// Never picks a destination; the actor only follows requests made on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Directed;

impl TargetingPolicy for Directed {
    fn choose(&mut self, _: &Mover, _: &[Candidate], _: &TileMap) -> Option<CellCoord> {
        None
    }
}

/// Stock policy for each role.
#[must_use]
pub fn policy_for(role: Role) -> Box<dyn TargetingPolicy> {
    match role {
        Role::Pursuer => Box::new(ChaseNearest::new(Retarget::WhenIdle)),
        Role::Hunter => Box::new(ChaseNearest::new(Retarget::EveryTick)),
        Role::Evader => Box::new(FleeNearest::new()),
        Role::Directed => Box::new(Directed),
    }
}

fn nearest<'a>(
    origin: Vec2,
    candidates: &'a [Candidate],
    map: &TileMap,
) -> Option<&'a Candidate> {
    let mut best: Option<(&Candidate, f32)> = None;
    for candidate in candidates {
        let distance = map.point_distance(
            (origin.x, origin.y),
            (candidate.position.x, candidate.position.y),
        );
        match best {
            Some((_, closest)) if distance >= closest => {}
            _ => best = Some((candidate, distance)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

fn refuge_from(threat: CellCoord, map: &TileMap) -> Option<CellCoord> {
    let (width, height) = (map.width(), map.height());
    if width == 0 || height == 0 {
        return None;
    }

    let cell = match map.topology() {
        Topology::Toroidal => CellCoord::new(
            (threat.column() + width / 2) % width,
            (threat.row() + height / 2) % height,
        ),
        Topology::Bounded => CellCoord::new(
            far_edge(threat.column(), width),
            far_edge(threat.row(), height),
        ),
    };
    Some(cell)
}

fn far_edge(value: u32, extent: u32) -> u32 {
    if value < extent / 2 {
        extent - 1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u32, column: u32, row: u32) -> Candidate {
        Candidate {
            id: ActorId::new(id),
            cell: CellCoord::new(column, row),
            position: Vec2::new(column as f32, row as f32),
        }
    }

    #[test]
    fn chase_picks_nearest_and_breaks_ties_by_order() {
        let map = TileMap::new(10, 10);
        let mover = Mover::new(CellCoord::new(5, 5), 1.0);
        let mut policy = ChaseNearest::new(Retarget::WhenIdle);

        let choice = policy.choose(
            &mover,
            &[candidate(1, 9, 9), candidate(2, 5, 7), candidate(3, 7, 5)],
            &map,
        );

        assert_eq!(choice, Some(CellCoord::new(5, 7)));
        assert_eq!(policy.focus(), Some(ActorId::new(2)));
    }

    #[test]
    fn chase_measures_the_short_way_round() {
        let map = TileMap::new(10, 10).with_topology(Topology::Toroidal);
        let mover = Mover::new(CellCoord::new(0, 0), 1.0);
        let mut policy = ChaseNearest::new(Retarget::WhenIdle);

        let choice = policy.choose(&mover, &[candidate(1, 4, 4), candidate(2, 9, 9)], &map);

        assert_eq!(choice, Some(CellCoord::new(9, 9)));
    }

    #[test]
    fn chase_without_candidates_does_nothing() {
        let map = TileMap::new(4, 4);
        let mover = Mover::new(CellCoord::new(0, 0), 1.0);
        let mut policy = ChaseNearest::new(Retarget::EveryTick);
        assert_eq!(policy.choose(&mover, &[], &map), None);
        assert_eq!(policy.focus(), None);
    }

    #[test]
    fn flee_targets_opposite_corner_on_bounded_maps() {
        let map = TileMap::new(8, 6);
        let mover = Mover::new(CellCoord::new(2, 2), 1.0);
        let mut policy = FleeNearest::new();

        let choice = policy.choose(&mover, &[candidate(1, 1, 1)], &map);

        assert_eq!(choice, Some(CellCoord::new(7, 5)));
    }

    #[test]
    fn flee_targets_antipode_on_toroidal_maps() {
        let map = TileMap::new(8, 6).with_topology(Topology::Toroidal);
        let mover = Mover::new(CellCoord::new(2, 2), 1.0);
        let mut policy = FleeNearest::new();

        let choice = policy.choose(&mover, &[candidate(1, 1, 1)], &map);
        assert_eq!(choice, Some(CellCoord::new(5, 4)));
        assert_eq!(policy.focus(), Some(ActorId::new(1)));

        let choice = policy.choose(&mover, &[candidate(1, 6, 5)], &map);
        assert_eq!(choice, None, "already standing on the antipode");
    }

    #[test]
    fn directed_never_chooses() {
        let map = TileMap::new(4, 4);
        let mover = Mover::new(CellCoord::new(0, 0), 1.0);
        assert_eq!(Directed.choose(&mover, &[candidate(1, 3, 3)], &map), None);
    }
}
