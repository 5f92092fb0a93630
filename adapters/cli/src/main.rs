#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Grid Chase simulation.

mod config;
mod frame;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use gridchase_core::{CellCoord, CellPoint, Command, Event, Topology};
use gridchase_map::{Scatter, TileMap};
use gridchase_system_motion::FrameClock;
use gridchase_world::{self as world, World};
use tracing_subscriber::EnvFilter;

use crate::config::SimulationConfig;

/// Longest tick the driver feeds the world; longer frame times wrap around.
const MAX_TICK_MILLIS: u64 = 1000;

/// Runs a Grid Chase simulation and prints the final frame.
#[derive(Debug, Parser)]
#[command(name = "gridchase", version)]
struct Args {
    /// TOML file describing the map, actors and sentries.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the random wall fill.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of ticks to simulate.
    #[arg(long)]
    ticks: Option<u32>,
    /// Milliseconds of simulated time per tick.
    #[arg(long = "dt-ms")]
    dt_ms: Option<u64>,
    /// Connect opposite map edges.
    #[arg(long)]
    wrap: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut SimulationConfig) {
        if let Some(seed) = self.seed {
            config.map.seed = seed;
        }
        if let Some(ticks) = self.ticks {
            config.run.ticks = ticks;
        }
        if let Some(dt_ms) = self.dt_ms {
            config.run.dt_ms = dt_ms;
        }
        if self.wrap {
            config.map.topology = Topology::Toroidal;
        }
    }
}

/// Running totals reported once the run completes.
#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    steps: usize,
    paths: usize,
    unreachable: usize,
    halts: usize,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::ActorStepped { actor, from, to } => {
                    self.steps += 1;
                    tracing::trace!(actor = actor.get(), ?from, ?to, "actor stepped");
                }
                Event::PathAssigned {
                    actor,
                    destination,
                    length,
                } => {
                    self.paths += 1;
                    tracing::debug!(actor = actor.get(), ?destination, length, "path assigned");
                }
                Event::PathUnavailable { actor, requested } => {
                    self.unreachable += 1;
                    tracing::debug!(actor = actor.get(), ?requested, "path unavailable");
                }
                Event::ActorHalted { .. } => self.halts += 1,
                Event::CommandRejected { reason } => {
                    tracing::warn!(%reason, "command rejected");
                }
                _ => {}
            }
        }
    }
}

/// Entry point for the Grid Chase command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    args.apply_overrides(&mut config);

    let mut world = build_world(&config)?;
    let tally = run(&mut world, &config);
    tracing::info!(
        ticks = config.run.ticks,
        steps = tally.steps,
        paths = tally.paths,
        unreachable = tally.unreachable,
        halts = tally.halts,
        "simulation finished"
    );

    print!("{}", frame::render(&world));
    Ok(())
}

fn build_map(config: &SimulationConfig) -> Result<TileMap> {
    let settings = &config.map;
    let map = match &settings.layout {
        Some(layout) => TileMap::from_layout(layout).context("invalid map layout")?,
        None => {
            let mut map = TileMap::new(settings.width, settings.height);
            let keep_open: Vec<CellCoord> = config
                .actors
                .iter()
                .map(|actor| CellCoord::new(actor.cell[0], actor.cell[1]))
                .collect();
            let placed = Scatter::new(settings.density, settings.seed).apply(&mut map, &keep_open);
            tracing::info!(
                width = settings.width,
                height = settings.height,
                placed,
                "generated map"
            );
            map
        }
    };

    Ok(map
        .with_topology(settings.topology)
        .with_neighborhood(settings.neighborhood))
}

fn build_world(config: &SimulationConfig) -> Result<World> {
    let frames = FrameClock::new(
        config.animation.frames,
        config.animation.frames_per_second,
    );
    let mut world = World::new(build_map(config)?).with_frames(frames);
    let mut events = Vec::new();

    for (index, actor) in config.actors.iter().enumerate() {
        events.clear();
        world::apply(
            &mut world,
            Command::SpawnActor {
                role: actor.role,
                cell: CellCoord::new(actor.cell[0], actor.cell[1]),
                speed: actor.speed,
            },
            &mut events,
        );
        if let Some(Event::CommandRejected { reason }) = events.first() {
            bail!("actor #{index} could not be spawned: {reason}");
        }
    }

    for (index, sentry) in config.sentries.iter().enumerate() {
        events.clear();
        world::apply(
            &mut world,
            Command::PlaceSentry {
                position: CellPoint::new(sentry.position[0], sentry.position[1]),
                heading: sentry.heading,
                fov: sentry.fov,
                radius: sentry.radius,
            },
            &mut events,
        );
        if let Some(Event::CommandRejected { reason }) = events.first() {
            bail!("sentry #{index} could not be placed: {reason}");
        }
    }

    Ok(world)
}

fn run(world: &mut World, config: &SimulationConfig) -> Tally {
    let dt = tick_duration(config.run.dt_ms);
    let mut tally = Tally::default();
    let mut events = Vec::new();

    for _ in 0..config.run.ticks {
        events.clear();
        world::apply(world, Command::Tick { dt }, &mut events);
        tally.record(&events);
    }

    tally
}

fn tick_duration(dt_ms: u64) -> Duration {
    Duration::from_millis(dt_ms % MAX_TICK_MILLIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("gridchase").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn flags_override_config() {
        let mut config = SimulationConfig::default();
        parse(&["--seed", "7", "--ticks", "3", "--dt-ms", "20", "--wrap"])
            .apply_overrides(&mut config);

        assert_eq!(config.map.seed, 7);
        assert_eq!(config.run.ticks, 3);
        assert_eq!(config.run.dt_ms, 20);
        assert_eq!(config.map.topology, Topology::Toroidal);
    }

    #[test]
    fn long_frames_wrap_around() {
        assert_eq!(tick_duration(16), Duration::from_millis(16));
        assert_eq!(tick_duration(1016), Duration::from_millis(16));
        assert_eq!(tick_duration(1000), Duration::ZERO);
    }

    #[test]
    fn default_run_moves_actors() {
        let mut config = SimulationConfig::default();
        config.run.ticks = 120;
        let mut world = build_world(&config).expect("default world builds");

        let tally = run(&mut world, &config);

        assert!(tally.paths > 0);
        assert!(tally.steps > 0);
        assert_eq!(world::query::tick_index(&world), 120);
    }

    #[test]
    fn layout_config_builds_the_drawn_map() {
        let config = SimulationConfig::parse(
            r#"
            actors = [{ role = "directed", cell = [0, 0] }]
            sentries = []

            [map]
            layout = """
            ..#
            ...
            """
            "#,
        )
        .expect("valid config");

        let world = build_world(&config).expect("layout world builds");
        assert_eq!(frame::render(&world), "D.#\n...\n");
    }

    #[test]
    fn blocked_spawn_is_an_error() {
        let config = SimulationConfig::parse(
            r#"
            actors = [{ role = "evader", cell = [2, 0] }]

            [map]
            layout = "..#"
            "#,
        )
        .expect("valid config");

        assert!(build_world(&config).is_err());
    }

    #[test]
    fn negative_sentry_cone_is_an_error() {
        let config = SimulationConfig::parse(
            r#"
            actors = []

            [[sentries]]
            position = [0.5, 0.5]
            fov = -1.0

            [map]
            layout = "..."
            "#,
        )
        .expect("valid config");

        let error = build_world(&config).expect_err("rejected sentry");
        assert!(error.to_string().contains("sentry #0"));
    }
}
