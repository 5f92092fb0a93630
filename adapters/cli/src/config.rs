//! Simulation settings loaded from TOML.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use gridchase_core::{Neighborhood, Role, Topology};
use gridchase_map::Scatter;
use serde::Deserialize;

/// Everything needed to build and run a headless simulation.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationConfig {
    pub(crate) map: MapConfig,
    pub(crate) run: RunConfig,
    pub(crate) animation: AnimationConfig,
    pub(crate) actors: Vec<ActorConfig>,
    pub(crate) sentries: Vec<SentryConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            run: RunConfig::default(),
            animation: AnimationConfig::default(),
            actors: default_actors(),
            sentries: default_sentries(),
        }
    }
}

impl SimulationConfig {
    /// Reads and parses a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parses configuration text.
    pub(crate) fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Shape and population of the tile map.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MapConfig {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) topology: Topology,
    pub(crate) neighborhood: Neighborhood,
    pub(crate) density: f64,
    pub(crate) seed: u64,
    /// Hand-drawn layout; replaces the size and random fill when present.
    pub(crate) layout: Option<String>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 30,
            topology: Topology::Bounded,
            neighborhood: Neighborhood::Octile,
            density: Scatter::DEFAULT_DENSITY,
            seed: 0,
            layout: None,
        }
    }
}

/// Length and granularity of the run.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RunConfig {
    pub(crate) ticks: u32,
    pub(crate) dt_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            dt_ms: 16,
        }
    }
}

/// Sprite cycle given to every actor.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AnimationConfig {
    pub(crate) frames: u32,
    pub(crate) frames_per_second: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: 2,
            frames_per_second: 8.0,
        }
    }
}

/// Actor spawned before the first tick.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct ActorConfig {
    pub(crate) role: Role,
    pub(crate) cell: [u32; 2],
    #[serde(default = "default_speed")]
    pub(crate) speed: f32,
}

/// Sentry placed before the first tick.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct SentryConfig {
    pub(crate) position: [f32; 2],
    #[serde(default)]
    pub(crate) heading: f32,
    #[serde(default = "default_fov")]
    pub(crate) fov: f32,
    #[serde(default = "default_radius")]
    pub(crate) radius: i32,
}

fn default_speed() -> f32 {
    2.0
}

fn default_fov() -> f32 {
    100.0
}

fn default_radius() -> i32 {
    10
}

fn default_actors() -> Vec<ActorConfig> {
    vec![
        ActorConfig {
            role: Role::Hunter,
            cell: [1, 1],
            speed: default_speed(),
        },
        ActorConfig {
            role: Role::Evader,
            cell: [20, 15],
            speed: 1.5,
        },
        ActorConfig {
            role: Role::Evader,
            cell: [38, 28],
            speed: 1.5,
        },
    ]
}

fn default_sentries() -> Vec<SentryConfig> {
    vec![SentryConfig {
        position: [20.5, 2.5],
        heading: 90.0,
        fov: default_fov(),
        radius: default_radius(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = SimulationConfig::parse("").expect("empty config parses");
        assert_eq!(config.map, MapConfig::default());
        assert_eq!(config.run, RunConfig::default());
        assert_eq!(config.actors, default_actors());
        assert_eq!(config.sentries.len(), 1);
    }

    #[test]
    fn full_file_parses() {
        let config = SimulationConfig::parse(
            r#"
            [map]
            width = 12
            height = 8
            topology = "toroidal"
            neighborhood = "cardinal"
            density = 0.2
            seed = 9

            [run]
            ticks = 30
            dt_ms = 1016

            [[actors]]
            role = "pursuer"
            cell = [0, 0]

            [[actors]]
            role = "evader"
            cell = [5, 5]
            speed = 3.0

            [[sentries]]
            position = [1.5, 1.5]
            heading = 45.0
            "#,
        )
        .expect("valid config");

        assert_eq!(config.map.topology, Topology::Toroidal);
        assert_eq!(config.map.neighborhood, Neighborhood::Cardinal);
        assert_eq!(config.run.dt_ms, 1016);
        assert_eq!(config.actors.len(), 2);
        assert_eq!(config.actors[0].speed, default_speed());
        assert_eq!(config.actors[1].role, Role::Evader);
        assert_eq!(config.sentries[0].radius, 10);
        assert_eq!(config.sentries[0].fov, 100.0);
    }

    #[test]
    fn explicit_empty_lists_remove_defaults() {
        let config = SimulationConfig::parse("actors = []\nsentries = []").expect("valid config");
        assert!(config.actors.is_empty());
        assert!(config.sentries.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(SimulationConfig::parse("[map]\nwidht = 3").is_err());
    }
}
