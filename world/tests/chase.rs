use std::time::Duration;

use gridchase_core::{ActorId, CellCoord, Command, Event, Role, Topology};
use gridchase_map::TileMap;
use gridchase_system_motion::MotionState;
use gridchase_world::{self as world, query, World};

fn tick(world: &mut World, millis: u64, events: &mut Vec<Event>) {
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
        events,
    );
}

fn spawn(world: &mut World, role: Role, cell: CellCoord, speed: f32) -> ActorId {
    let mut events = Vec::new();
    world::apply(world, Command::SpawnActor { role, cell, speed }, &mut events);
    match events.as_slice() {
        [Event::ActorSpawned { actor, .. }] => *actor,
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn pursuer_catches_a_stationary_target() {
    let mut world = World::new(TileMap::new(8, 8));
    let pursuer = spawn(&mut world, Role::Pursuer, CellCoord::new(0, 0), 4.0);
    let quarry = spawn(&mut world, Role::Directed, CellCoord::new(5, 3), 1.0);

    let mut events = Vec::new();
    for _ in 0..20 {
        tick(&mut world, 250, &mut events);
    }

    let snapshot = query::actor(&world, pursuer).expect("pursuer exists");
    assert_eq!(snapshot.cell, CellCoord::new(5, 3));
    assert_eq!(snapshot.state, MotionState::Idle);
    assert_eq!(snapshot.focus, Some(quarry));
    assert!(events.contains(&Event::ActorHalted {
        actor: pursuer,
        cell: CellCoord::new(5, 3),
    }));
}

#[test]
fn directed_actor_ignores_others() {
    let mut world = World::new(TileMap::new(6, 6));
    let directed = spawn(&mut world, Role::Directed, CellCoord::new(0, 0), 1.0);
    let _ = spawn(&mut world, Role::Pursuer, CellCoord::new(5, 5), 1.0);

    let mut events = Vec::new();
    tick(&mut world, 100, &mut events);

    let snapshot = query::actor(&world, directed).expect("directed exists");
    assert_eq!(snapshot.state, MotionState::Idle);
    assert_eq!(snapshot.focus, None);
}

#[test]
fn evader_heads_for_the_antipode() {
    let mut world = World::new(TileMap::new(10, 1).with_topology(Topology::Toroidal));
    let evader = spawn(&mut world, Role::Evader, CellCoord::new(2, 0), 1.0);
    let _ = spawn(&mut world, Role::Pursuer, CellCoord::new(0, 0), 0.0);

    let mut events = Vec::new();
    tick(&mut world, 0, &mut events);

    assert!(events.contains(&Event::PathAssigned {
        actor: evader,
        destination: CellCoord::new(5, 0),
        length: 3,
    }));
}

#[test]
fn ticks_advance_the_sprite_clock() {
    let mut world = World::new(TileMap::new(3, 3));
    let actor = spawn(&mut world, Role::Directed, CellCoord::new(1, 1), 1.0);

    let mut events = Vec::new();
    tick(&mut world, 125, &mut events);

    let snapshot = query::actor(&world, actor).expect("actor exists");
    assert_eq!(snapshot.frame, 1);
}
