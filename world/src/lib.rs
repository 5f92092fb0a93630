#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Grid Chase.
//!
//! The [`World`] owns the tile map, the actors and the sentries. Drivers only
//! mutate it through [`apply`] and only read it through the [`query`] module.

use std::time::Duration;

use gridchase_core::{
    ActorId, CellCoord, CellPoint, Command, CommandError, Event, Path, Role, SentryId,
};
use gridchase_map::TileMap;
use gridchase_system_motion::{Actor, Candidate, FrameClock, MotionError, MotionEvent};
use gridchase_system_visibility::{Sentry, VisibilityField};

/// Represents the authoritative Grid Chase world state.
#[derive(Debug)]
pub struct World {
    map: TileMap,
    actors: Vec<Actor>,
    sentries: Vec<(SentryId, Sentry)>,
    visibility: VisibilityField,
    frames: FrameClock,
    next_actor: u32,
    next_sentry: u32,
    tick_index: u64,
}

impl World {
    /// Creates a world over `map` with no actors or sentries.
    #[must_use]
    pub fn new(map: TileMap) -> Self {
        let visibility = VisibilityField::for_map(&map);
        Self {
            map,
            actors: Vec::new(),
            sentries: Vec::new(),
            visibility,
            frames: FrameClock::default(),
            next_actor: 0,
            next_sentry: 0,
            tick_index: 0,
        }
    }

    /// Returns the world with the sprite clock given to every actor spawned later.
    #[must_use]
    pub fn with_frames(mut self, frames: FrameClock) -> Self {
        self.frames = frames;
        self
    }

    fn actor_mut(&mut self, actor: ActorId) -> Result<&mut Actor, CommandError> {
        self.actors
            .iter_mut()
            .find(|candidate| candidate.id() == actor)
            .ok_or(CommandError::UnknownActor(actor))
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let snapshot: Vec<(Role, Candidate)> = self
            .actors
            .iter()
            .map(|actor| (actor.role(), actor.candidate()))
            .collect();

        let mut motion = Vec::new();
        let mut candidates = Vec::with_capacity(snapshot.len());
        for actor in &mut self.actors {
            candidates.clear();
            candidates.extend(
                snapshot
                    .iter()
                    .filter(|(role, other)| other.id != actor.id() && actor.role().regards(*role))
                    .map(|(_, other)| *other),
            );

            motion.clear();
            actor.tick(&self.map, dt, &candidates, &mut motion);
            out_events.extend(motion.drain(..).map(|event| lift(actor.id(), event)));
        }

        let visible = self.visibility.recompute(
            &self.map,
            self.sentries.iter().map(|(_, sentry)| sentry.sweep()),
        );
        out_events.push(Event::VisibilityRecomputed { visible });
    }

    fn spawn(
        &mut self,
        role: Role,
        cell: CellCoord,
        speed: f32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(CommandError::InvalidSpeed);
        }
        self.ensure_traversable(cell)?;

        let id = ActorId::new(self.next_actor);
        self.next_actor = self.next_actor.saturating_add(1);
        self.actors
            .push(Actor::new(id, role, cell, speed).with_frames(self.frames));
        tracing::debug!(actor = id.get(), ?role, ?cell, "actor spawned");
        out_events.push(Event::ActorSpawned {
            actor: id,
            role,
            cell,
        });
        Ok(())
    }

    fn assign_path(
        &mut self,
        actor: ActorId,
        path: Path,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        for cell in path.iter() {
            self.ensure_traversable(cell)?;
        }
        let chained = path
            .iter()
            .zip(path.iter().skip(1))
            .all(|(from, to)| self.map.adjacent(from, to));
        if !chained {
            return Err(CommandError::Detached { actor });
        }

        let map = &self.map;
        let mover = self
            .actors
            .iter_mut()
            .find(|candidate| candidate.id() == actor)
            .ok_or(CommandError::UnknownActor(actor))?
            .mover_mut();
        let was_moving = mover.path().is_some();
        mover.assign_path(path, map).map_err(|error| match error {
            MotionError::InTransit => CommandError::InTransit(actor),
            MotionError::Detached { .. } => CommandError::Detached { actor },
        })?;

        match mover.path() {
            Some(path) => {
                if let Some(destination) = path.last() {
                    out_events.push(Event::PathAssigned {
                        actor,
                        destination,
                        length: path.len(),
                    });
                }
            }
            None if was_moving => out_events.push(Event::ActorHalted {
                actor,
                cell: mover.prev(),
            }),
            None => {}
        }
        Ok(())
    }

    fn set_tile(
        &mut self,
        cell: CellCoord,
        solid: bool,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        if !self.map.contains(cell) {
            return Err(CommandError::OutOfBounds(cell));
        }

        self.map.set_solid(cell, solid);
        out_events.push(Event::TileChanged { cell, solid });

        if solid {
            for actor in &mut self.actors {
                let destination = actor
                    .mover()
                    .path()
                    .filter(|path| path.contains(cell))
                    .and_then(Path::last);
                if let Some(destination) = destination {
                    tracing::debug!(
                        actor = actor.id().get(),
                        ?cell,
                        "path crosses new wall; replanning"
                    );
                    actor.mover_mut().set_destination(destination);
                }
            }
        }
        Ok(())
    }

    fn place_sentry(
        &mut self,
        position: CellPoint,
        heading: f32,
        fov: f32,
        radius: i32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        let finite = position.column().is_finite()
            && position.row().is_finite()
            && heading.is_finite()
            && fov.is_finite();
        if !finite || fov < 0.0 {
            return Err(CommandError::InvalidSentry);
        }

        let id = SentryId::new(self.next_sentry);
        self.next_sentry = self.next_sentry.saturating_add(1);
        self.sentries
            .push((id, Sentry::new(position, heading, fov, radius)));
        out_events.push(Event::SentryPlaced { sentry: id });
        Ok(())
    }

    fn ensure_traversable(&self, cell: CellCoord) -> Result<(), CommandError> {
        if !self.map.contains(cell) {
            return Err(CommandError::OutOfBounds(cell));
        }
        if self.map.is_solid(cell) {
            return Err(CommandError::Blocked(cell));
        }
        Ok(())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let outcome = match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance(dt, out_events);
            Ok(())
        }
        Command::SpawnActor { role, cell, speed } => world.spawn(role, cell, speed, out_events),
        Command::SetDestination { actor, cell } => world.actor_mut(actor).map(|target| {
            target.mover_mut().set_destination(cell);
        }),
        Command::AssignPath { actor, path } => world.assign_path(actor, path, out_events),
        Command::SetTile { cell, solid } => world.set_tile(cell, solid, out_events),
        Command::PlaceSentry {
            position,
            heading,
            fov,
            radius,
        } => world.place_sentry(position, heading, fov, radius, out_events),
    };

    if let Err(reason) = outcome {
        tracing::debug!(%reason, "command rejected");
        out_events.push(Event::CommandRejected { reason });
    }
}

fn lift(actor: ActorId, event: MotionEvent) -> Event {
    match event {
        MotionEvent::Stepped { from, to } => Event::ActorStepped { actor, from, to },
        MotionEvent::PathAssigned {
            destination,
            length,
        } => Event::PathAssigned {
            actor,
            destination,
            length,
        },
        MotionEvent::PathUnavailable { requested } => Event::PathUnavailable { actor, requested },
        MotionEvent::Halted { cell } => Event::ActorHalted { actor, cell },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use gridchase_core::{ActorId, CellCoord, Role, SentryId};
    use gridchase_map::TileMap;
    use gridchase_system_motion::{Actor, MotionState};
    use gridchase_system_visibility::{Sentry, VisibilityField};

    use super::World;

    /// Provides read-only access to the tile map.
    #[must_use]
    pub fn map(world: &World) -> &TileMap {
        &world.map
    }

    /// Provides read-only access to the visibility computed on the last tick.
    #[must_use]
    pub fn visibility(world: &World) -> &VisibilityField {
        &world.visibility
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Sentries in placement order.
    pub fn sentries(world: &World) -> impl Iterator<Item = (SentryId, &Sentry)> {
        world.sentries.iter().map(|(id, sentry)| (*id, sentry))
    }

    /// Captures a read-only view of every actor.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        let mut snapshots: Vec<ActorSnapshot> = world.actors.iter().map(snapshot).collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        ActorView { snapshots }
    }

    /// Captures a single actor, if it exists.
    #[must_use]
    pub fn actor(world: &World, id: ActorId) -> Option<ActorSnapshot> {
        world
            .actors
            .iter()
            .find(|actor| actor.id() == id)
            .map(snapshot)
    }

    fn snapshot(actor: &Actor) -> ActorSnapshot {
        let mover = actor.mover();
        ActorSnapshot {
            id: actor.id(),
            role: actor.role(),
            cell: mover.prev(),
            target: mover.target(),
            position: mover.position(),
            state: mover.state(),
            pending: mover.pending(),
            focus: actor.focus(),
            frame: actor.frames().frame(),
        }
    }

    /// Read-only snapshot describing all actors.
    #[derive(Clone, Debug)]
    pub struct ActorView {
        snapshots: Vec<ActorSnapshot>,
    }

    impl ActorView {
        /// Iterator over the captured snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the owned snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<ActorSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single actor.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ActorSnapshot {
        /// Identifier of the actor.
        pub id: ActorId,
        /// Role the actor was spawned with.
        pub role: Role,
        /// Cell most recently departed, or the resting cell.
        pub cell: CellCoord,
        /// Cell being approached.
        pub target: CellCoord,
        /// Continuous position measured in cells.
        pub position: Vec2,
        /// Coarse motion phase.
        pub state: MotionState,
        /// Latched destination awaiting resolution.
        pub pending: Option<CellCoord>,
        /// Actor the targeting policy is reacting to.
        pub focus: Option<ActorId>,
        /// Sprite frame currently shown.
        pub frame: u32,
    }
}
