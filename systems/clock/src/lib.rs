#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame orchestration for Outpost.
//!
//! [`SimulationClock`] owns the world and every system and advances them in
//! a fixed order once per frame. Systems never touch the world directly:
//! they read views and emit commands which the clock applies in sequence.

use std::{collections::BTreeMap, time::Duration};

use outpost_core::{
    config::{WorldConfig, SPAWN_INTERVAL},
    BuildingKind, Command, EnemyId, Event, FrameInput, PositionUpdate, Vec2,
};
use outpost_system_builder::{Builder, BuilderInput, PlacementPreview};
use outpost_system_camera::{CameraControl, CameraInput};
use outpost_system_movement::Movement;
use outpost_system_spawning::{Config as SpawningConfig, Spawning};
use outpost_world::{self as world, query, World};

/// Parameters required to start a session.
#[derive(Clone, Debug)]
pub struct Config {
    world: WorldConfig,
    seed: u64,
    spawn_interval: Duration,
}

impl Config {
    /// Creates a configuration with the default world and the provided seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            world: WorldConfig::default(),
            seed,
            spawn_interval: SPAWN_INTERVAL,
        }
    }

    /// Replaces the world configuration.
    #[must_use]
    pub fn with_world(mut self, world: WorldConfig) -> Self {
        self.world = world;
        self
    }

    /// Replaces the spawner cadence.
    #[must_use]
    pub fn with_spawn_interval(mut self, spawn_interval: Duration) -> Self {
        self.spawn_interval = spawn_interval;
        self
    }
}

/// Everything the presentation layer needs to know about a single frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Number of ticks processed so far, this frame included.
    pub tick: u64,
    /// Events emitted by the world during the frame, in order.
    pub events: Vec<Event>,
    /// Latest position of every enemy whose presentation must move.
    pub position_updates: Vec<PositionUpdate>,
    /// Placement preview under the pointer, if a building is selected.
    pub preview: Option<PlacementPreview>,
}

/// Coalesces enemy position publications until the end of the frame.
///
/// Only the most recent position per enemy survives, so presentation writes
/// happen at most once per enemy per frame.
#[derive(Clone, Debug, Default)]
pub struct PendingUpdates {
    positions: BTreeMap<EnemyId, Vec2>,
}

impl PendingUpdates {
    /// Records the position publications contained in `events`.
    pub fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned {
                    enemy, position, ..
                }
                | Event::EnemyMoved { enemy, position } => {
                    let _ = self.positions.insert(*enemy, *position);
                }
                Event::EnemyDespawned { enemy, .. } => {
                    let _ = self.positions.remove(enemy);
                }
                _ => {}
            }
        }
    }

    /// Reports whether any update is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Drains the queued updates in enemy identifier order.
    pub fn drain(&mut self) -> Vec<PositionUpdate> {
        std::mem::take(&mut self.positions)
            .into_iter()
            .map(|(enemy, position)| PositionUpdate { enemy, position })
            .collect()
    }
}

/// Owner of the world and every system.
#[derive(Debug)]
pub struct SimulationClock {
    world: World,
    spawning: Spawning,
    movement: Movement,
    builder: Builder,
    camera: CameraControl,
    pending: PendingUpdates,
}

impl SimulationClock {
    /// Creates the world, places spawners and performs the initial fog pass.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let world_size = Vec2::new(config.world.width, config.world.height);
        let spawning_config = SpawningConfig::new(config.spawn_interval, config.seed)
            .with_enemy_cap(config.world.max_enemies_per_spawner)
            .with_spawner_size(config.world.spawner_size);
        let mut clock = Self {
            world: World::with_config(config.world),
            spawning: Spawning::new(spawning_config),
            movement: Movement::default(),
            builder: Builder::new(),
            camera: CameraControl::default(),
            pending: PendingUpdates::default(),
        };

        let mut commands = Vec::new();
        clock.spawning.place_spawners(world_size, &mut commands);
        commands.push(Command::RefreshFog);
        commands.push(Command::RevealEntities);
        let mut events = Vec::new();
        dispatch(&mut clock.world, commands.drain(..), &mut events);

        clock
            .spawning
            .handle(&events, &query::spawner_view(&clock.world), &mut commands);
        dispatch(&mut clock.world, commands, &mut events);
        tracing::info!(
            spawners = query::spawner_view(&clock.world).iter().count(),
            seed = config.seed,
            "session initialised"
        );
        clock
    }

    /// Provides read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Catalog entry currently selected for placement.
    #[must_use]
    pub fn selected_building(&self) -> Option<BuildingKind> {
        self.builder.selected()
    }

    /// Reports whether the camera follows the player.
    #[must_use]
    pub fn camera_following(&self) -> bool {
        self.camera.following()
    }

    /// Forwards new viewport dimensions to the world.
    pub fn resize(&mut self, width: f32, height: f32) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::ResizeViewport { width, height },
            &mut events,
        );
        events
    }

    /// Advances the simulation by one frame.
    pub fn step(&mut self, dt: Duration, input: &FrameInput) -> FrameReport {
        let mut events = Vec::new();

        if input.movement.any() {
            dispatch(
                &mut self.world,
                [Command::MovePlayer {
                    movement: input.movement,
                    sprint: input.sprint,
                }],
                &mut events,
            );
        }

        let mut commands = Vec::new();
        self.camera.handle(
            CameraInput {
                toggle_follow: input.toggle_follow,
                hold_center: input.hold_center,
                pointer: input.pointer,
                viewport: query::viewport(&self.world).size(),
            },
            &mut commands,
        );
        commands.push(Command::RefreshFog);
        commands.push(Command::Tick { dt });
        dispatch(&mut self.world, commands.drain(..), &mut events);

        self.spawning
            .handle(&events, &query::spawner_view(&self.world), &mut commands);
        dispatch(&mut self.world, commands.drain(..), &mut events);

        self.movement.handle(
            &events,
            &query::enemy_view(&self.world),
            query::player_position(&self.world),
            &mut commands,
        );
        commands.push(Command::RebuildSpatialIndex);
        commands.push(Command::RevealEntities);
        dispatch(&mut self.world, commands.drain(..), &mut events);

        let builder_input = BuilderInput::new(
            input.select_building.and_then(BuildingKind::from_hotkey),
            input.cancel_selection,
            input.confirm_placement,
        );
        self.builder.update_selection(builder_input);
        let preview = self.preview(input.pointer);
        self.builder.handle(preview, builder_input, &mut commands);
        dispatch(&mut self.world, commands.drain(..), &mut events);

        self.pending.record(&events);
        let tick = query::tick_index(&self.world);
        tracing::trace!(tick, events = events.len(), "frame advanced");

        FrameReport {
            tick,
            position_updates: self.pending.drain(),
            events,
            preview: self.preview(input.pointer),
        }
    }

    fn preview(&self, pointer: Option<Vec2>) -> Option<PlacementPreview> {
        let origin = pointer.map(|screen| {
            query::snap_to_grid(&self.world, query::screen_to_world(&self.world, screen))
        });
        self.builder
            .preview(origin, query::config(&self.world).building_size, |origin| {
                query::validate_placement(&self.world, origin).is_ok()
            })
    }
}

fn dispatch(
    world: &mut World,
    commands: impl IntoIterator<Item = Command>,
    events: &mut Vec<Event>,
) {
    for command in commands {
        world::apply(world, command, events);
    }
}
