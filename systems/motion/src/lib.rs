#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic motion system that moves actors along computed paths.
//!
//! Every actor pairs a [`Mover`], which interpolates between cells, with a
//! [`TargetingPolicy`] that decides where the mover should head next. The map
//! is never held by an actor; it is passed into every update so the world
//! stays the single owner of tile state.

use std::time::Duration;

use glam::Vec2;
use gridchase_core::{ActorId, CellCoord, Role};
use gridchase_map::TileMap;
use thiserror::Error;

mod animation;
mod mover;
mod policy;

pub use animation::FrameClock;
pub use mover::{MotionState, Mover};
pub use policy::{
    policy_for, Candidate, ChaseNearest, Directed, FleeNearest, Retarget, TargetingPolicy,
};

/// Outcome of advancing a single mover, reported in the order it happened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionEvent {
    /// A leg finished and the mover now rests on or passes through `to`.
    Stepped {
        /// Cell the leg departed from.
        from: CellCoord,
        /// Cell the leg arrived at.
        to: CellCoord,
    },
    /// A latched destination resolved into a path.
    PathAssigned {
        /// Final cell of the path.
        destination: CellCoord,
        /// Number of cells in the path.
        length: usize,
    },
    /// A latched destination could not be reached.
    PathUnavailable {
        /// Cell originally requested.
        requested: CellCoord,
    },
    /// The mover came to rest.
    Halted {
        /// Cell the mover rests on.
        cell: CellCoord,
    },
}

/// Reasons a path cannot be installed on a mover.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MotionError {
    /// The mover is part way through a leg.
    #[error("mover is between cells")]
    InTransit,
    /// The first cell of the path is not adjacent to the resting cell.
    #[error("path starts at {to:?}, which is not adjacent to {from:?}")]
    Detached {
        /// Cell the mover rests on.
        from: CellCoord,
        /// First cell of the rejected path.
        to: CellCoord,
    },
}

/// Mobile entity driven by a targeting policy.
#[derive(Debug)]
pub struct Actor {
    id: ActorId,
    role: Role,
    mover: Mover,
    policy: Box<dyn TargetingPolicy>,
    frames: FrameClock,
}

impl Actor {
    /// Creates an actor resting on `cell` with the stock policy for `role`.
    #[must_use]
    pub fn new(id: ActorId, role: Role, cell: CellCoord, speed: f32) -> Self {
        Self::with_policy(id, role, Mover::new(cell, speed), policy_for(role))
    }

    /// Creates an actor from an explicit mover and policy.
    #[must_use]
    pub fn with_policy(
        id: ActorId,
        role: Role,
        mover: Mover,
        policy: Box<dyn TargetingPolicy>,
    ) -> Self {
        Self {
            id,
            role,
            mover,
            policy,
            frames: FrameClock::default(),
        }
    }

    /// Replaces the sprite clock.
    #[must_use]
    pub fn with_frames(mut self, frames: FrameClock) -> Self {
        self.frames = frames;
        self
    }

    /// Identifier of the actor.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Role the actor was spawned with.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Read-only access to the mover.
    #[must_use]
    pub const fn mover(&self) -> &Mover {
        &self.mover
    }

    /// Mutable access to the mover for externally issued requests.
    pub fn mover_mut(&mut self) -> &mut Mover {
        &mut self.mover
    }

    /// Sprite clock of the actor.
    #[must_use]
    pub const fn frames(&self) -> &FrameClock {
        &self.frames
    }

    /// Actor currently singled out by the policy, if any.
    #[must_use]
    pub fn focus(&self) -> Option<ActorId> {
        self.policy.focus()
    }

    /// Snapshot offered to other actors' policies.
    #[must_use]
    pub fn candidate(&self) -> Candidate {
        Candidate {
            id: self.id,
            cell: self.mover.prev(),
            position: self.mover.position(),
        }
    }

    /// Continuous position measured in cells.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.mover.position()
    }

    /// Runs the policy, then advances the mover and the sprite clock by `dt`.
    pub fn tick(
        &mut self,
        map: &TileMap,
        dt: Duration,
        candidates: &[Candidate],
        out: &mut Vec<MotionEvent>,
    ) {
        if let Some(cell) = self.policy.choose(&self.mover, candidates, map) {
            tracing::trace!(actor = self.id.get(), ?cell, "policy chose destination");
            self.mover.set_destination(cell);
        }
        self.mover.advance(map, dt, out);
        self.frames.advance(dt);
    }
}
