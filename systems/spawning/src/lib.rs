#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system responsible for placing spawners and emitting enemy spawn
//! commands on a fixed cadence.
//!
//! All randomness flows through a seeded [`ChaCha8Rng`], so a given seed and
//! event stream always produce the same spawner layout and spawn positions.

use std::{collections::BTreeMap, f32::consts::TAU, time::Duration};

use outpost_core::{
    config::{
        MAX_ENEMIES_PER_SPAWNER, MAX_SPAWNERS, MIN_SPAWNER_DISTANCE, SPAWNER_EDGE_MARGIN,
        SPAWNER_PLACEMENT_ATTEMPTS, SPAWNER_SIZE, SPAWN_INTERVAL, SPAWN_RADIUS,
    },
    Command, Event, SpawnerId, SpawnerView, Vec2,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
    max_enemies_per_spawner: u32,
    placement: PlacementConfig,
    spawner_size: f32,
    spawn_radius: f32,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
            max_enemies_per_spawner: MAX_ENEMIES_PER_SPAWNER,
            placement: PlacementConfig::new(),
            spawner_size: SPAWNER_SIZE,
            spawn_radius: SPAWN_RADIUS,
        }
    }

    /// Overrides the per-spawner live enemy cap.
    #[must_use]
    pub const fn with_enemy_cap(mut self, max_enemies_per_spawner: u32) -> Self {
        self.max_enemies_per_spawner = max_enemies_per_spawner;
        self
    }

    /// Overrides the spawner footprint side length used to centre spawns.
    #[must_use]
    pub const fn with_spawner_size(mut self, spawner_size: f32) -> Self {
        self.spawner_size = spawner_size;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(SPAWN_INTERVAL, 0)
    }
}

/// Parameters governing where spawners may be placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementConfig {
    /// Number of spawners to attempt to place.
    pub max_spawners: usize,
    /// Minimum distance between spawner origins and from the world centre.
    pub min_distance: f32,
    /// Sampling attempts per spawner before it is skipped.
    pub attempts: u32,
    /// Keep-out margin between spawner origins and the world edge.
    pub edge_margin: f32,
}

impl PlacementConfig {
    /// Creates placement parameters from the build-time constants.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_spawners: MAX_SPAWNERS,
            min_distance: MIN_SPAWNER_DISTANCE,
            attempts: SPAWNER_PLACEMENT_ATTEMPTS,
            edge_margin: SPAWNER_EDGE_MARGIN,
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Samples spawner origins by rejection.
///
/// Each spawner gets a fixed number of attempts; a candidate is accepted when
/// it keeps `min_distance` from the world centre and from every spawner
/// accepted before it. A spawner that exhausts its attempts is skipped, so
/// fewer than `max_spawners` origins may be returned.
pub fn place_spawners(
    world_size: Vec2,
    config: &PlacementConfig,
    rng: &mut ChaCha8Rng,
) -> Vec<Vec2> {
    let center = world_size / 2.0;
    let span = (world_size - Vec2::splat(2.0 * config.edge_margin)).max(Vec2::ZERO);
    let mut accepted: Vec<Vec2> = Vec::with_capacity(config.max_spawners);

    for index in 0..config.max_spawners {
        let mut placed = None;
        for _ in 0..config.attempts {
            let candidate = Vec2::new(
                rng.gen::<f32>() * span.x + config.edge_margin,
                rng.gen::<f32>() * span.y + config.edge_margin,
            );
            let clear_of_center = candidate.distance(center) >= config.min_distance;
            let clear_of_others = accepted
                .iter()
                .all(|other| candidate.distance(*other) >= config.min_distance);
            if clear_of_center && clear_of_others {
                placed = Some(candidate);
                break;
            }
        }

        match placed {
            Some(origin) => accepted.push(origin),
            None => tracing::debug!(
                index,
                attempts = config.attempts,
                "no valid spawner location found"
            ),
        }
    }

    accepted
}

/// Pure system that emits spawn commands for every known spawner.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    timers: BTreeMap<SpawnerId, Duration>,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            timers: BTreeMap::new(),
            config,
        }
    }

    /// Emits `CreateSpawner` commands for a freshly sampled spawner layout.
    pub fn place_spawners(&mut self, world_size: Vec2, out: &mut Vec<Command>) {
        let origins = place_spawners(world_size, &self.config.placement, &mut self.rng);
        tracing::info!(placed = origins.len(), "spawner layout sampled");
        out.extend(
            origins
                .into_iter()
                .map(|origin| Command::CreateSpawner { origin }),
        );
    }

    /// Consumes events and the spawner view to emit spawn commands.
    ///
    /// Each spawner fires once per elapsed interval. A firing is skipped when
    /// the spawner already owns its maximum number of enemies, counting the
    /// spawns requested earlier in the same call.
    pub fn handle(&mut self, events: &[Event], spawners: &SpawnerView, out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::SpawnerCreated { spawner, .. } => {
                    let _ = self.timers.entry(*spawner).or_insert(Duration::ZERO);
                }
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                _ => {}
            }
        }

        if elapsed.is_zero() || self.config.spawn_interval.is_zero() {
            return;
        }

        let interval = self.config.spawn_interval;
        let offset = Vec2::splat(self.config.spawner_size / 2.0);
        for (id, accumulator) in self.timers.iter_mut() {
            *accumulator = accumulator.saturating_add(elapsed);
            let Some(spawner) = spawners.get(*id) else {
                continue;
            };

            let mut projected = spawner.active_enemies;
            while *accumulator >= interval {
                *accumulator -= interval;
                if projected >= self.config.max_enemies_per_spawner {
                    continue;
                }
                let angle = self.rng.gen_range(0.0..TAU);
                let position = spawner.origin
                    + offset
                    + Vec2::new(angle.cos(), angle.sin()) * self.config.spawn_radius;
                out.push(Command::SpawnEnemy {
                    spawner: *id,
                    position,
                });
                projected += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_never_fires() {
        let mut spawning = Spawning::new(Config::new(Duration::ZERO, 1));
        let _ = spawning.timers.insert(SpawnerId::new(0), Duration::ZERO);
        let mut commands = Vec::new();
        spawning.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(10),
            }],
            &SpawnerView::default(),
            &mut commands,
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn impossible_constraints_place_nothing() {
        let config = PlacementConfig {
            min_distance: 10_000.0,
            ..PlacementConfig::new()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(place_spawners(Vec2::splat(4000.0), &config, &mut rng).is_empty());
    }
}
