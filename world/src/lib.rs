#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Outpost.
//!
//! The world owns every mutable piece of simulation state. It changes only
//! through [`apply`], which executes a single [`Command`] and appends the
//! resulting [`Event`] values, and it is inspected only through [`query`].

mod buildings;
mod camera;
mod fog;
mod pool;
mod spawners;

use outpost_core::{
    config::WorldConfig, Command, EnemyId, Event, Rect, SpawnRejection, SpawnerId, Vec2,
};
use outpost_spatial::Quadtree;

use buildings::{BuildingRegistry, PlacementRules};
use camera::Camera;
use spawners::SpawnerRegistry;

pub use fog::SpatialGrid;
pub use pool::{EnemyPool, EnemySlot};

/// Represents the authoritative Outpost world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    player: Vec2,
    camera: Camera,
    fog: SpatialGrid,
    fog_dirty: bool,
    pool: EnemyPool,
    spawners: SpawnerRegistry,
    buildings: BuildingRegistry,
    enemy_index: Quadtree<EnemyId>,
    tick_index: u64,
}

impl World {
    /// Creates a new world using the build-time configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a new world from an explicit configuration.
    ///
    /// The player starts at the configured start position with the camera
    /// centred on it. Fog starts dirty so the first refresh reveals the
    /// starting area.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        let player = config.player_start();
        let mut camera = Camera::new(Vec2::new(config.width, config.height), config.viewport);
        let _ = camera.center_on(player);
        let fog = SpatialGrid::new(
            config.chunk_columns(),
            config.chunk_rows(),
            config.chunk_size,
        );
        let enemy_index = Quadtree::with_limits(
            config.bounds(),
            config.quadtree_max_objects,
            config.quadtree_max_levels,
        );

        Self {
            player,
            camera,
            fog,
            fog_dirty: true,
            pool: EnemyPool::new(config.pool_size),
            spawners: SpawnerRegistry::default(),
            buildings: BuildingRegistry::new(),
            enemy_index,
            tick_index: 0,
            config,
        }
    }

    fn placement_rules(&self) -> PlacementRules {
        PlacementRules {
            world: self.config.bounds(),
            grid_size: self.config.grid_size,
            build_range: self.config.build_range,
            building_size: self.config.building_size,
            player: self.player,
        }
    }

    fn culling_region(&self) -> Rect {
        self.camera.rect().expanded(self.config.viewport_buffer)
    }

    fn clamp_player(&self, position: Vec2) -> Vec2 {
        let limit = Vec2::new(
            self.config.width - self.config.player_size,
            self.config.height - self.config.player_size,
        )
        .max(Vec2::ZERO);
        position.clamp(Vec2::ZERO, limit)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MovePlayer { movement, sprint } => {
            let speed = if sprint {
                world.config.player_speed * world.config.sprint_multiplier
            } else {
                world.config.player_speed
            };
            let from = world.player;
            let to = world.clamp_player(from + movement.step(speed));
            if to != from {
                world.player = to;
                world.fog_dirty = true;
                out_events.push(Event::PlayerMoved { from, to });
            }
        }
        Command::CenterCamera => {
            if world.camera.center_on(world.player) {
                world.fog_dirty = true;
                out_events.push(Event::CameraMoved {
                    offset: world.camera.offset(),
                });
            }
        }
        Command::ScrollCamera { edges } => {
            if world.camera.scroll(edges, world.config.camera_speed) {
                world.fog_dirty = true;
                out_events.push(Event::CameraMoved {
                    offset: world.camera.offset(),
                });
            }
        }
        Command::ResizeViewport { width, height } => {
            let before = world.camera.offset();
            if world.camera.resize(Vec2::new(width, height)) {
                world.fog_dirty = true;
                out_events.push(Event::ViewportResized {
                    size: world.camera.viewport(),
                });
                if world.camera.offset() != before {
                    out_events.push(Event::CameraMoved {
                        offset: world.camera.offset(),
                    });
                }
            }
        }
        Command::RefreshFog => {
            if !world.fog_dirty {
                return;
            }
            let sources = query::vision_sources(world);
            let visible_chunks = world
                .fog
                .recompute_visibility(&sources, world.camera.rect());
            world.fog_dirty = false;
            tracing::trace!(visible_chunks, sources = sources.len(), "fog recomputed");
            out_events.push(Event::FogRecomputed { visible_chunks });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.buildings.advance(
                dt,
                world.config.construction_step,
                world.config.construction_steps,
                out_events,
            );
        }
        Command::CreateSpawner { origin } => {
            let spawner = world.spawners.insert(origin);
            tracing::debug!(
                spawner = spawner.get(),
                x = origin.x,
                y = origin.y,
                "spawner created"
            );
            out_events.push(Event::SpawnerCreated { spawner, origin });
        }
        Command::SpawnEnemy { spawner, position } => {
            let cap = world.config.max_enemies_per_spawner;
            let Some(state) = world.spawners.get_mut(spawner) else {
                reject_spawn(spawner, SpawnRejection::UnknownSpawner, out_events);
                return;
            };
            if state.active_enemies >= cap {
                reject_spawn(spawner, SpawnRejection::SpawnerAtCapacity, out_events);
                return;
            }
            let Some(enemy) = world.pool.acquire(spawner, position) else {
                reject_spawn(spawner, SpawnRejection::PoolExhausted, out_events);
                return;
            };
            state.active_enemies += 1;

            let visible = world
                .fog
                .chunk_at(position)
                .is_some_and(|chunk| chunk.visible);
            let in_viewport = world.culling_region().contains_point(position);
            if let Some(slot) = world.pool.get_mut(enemy) {
                slot.set_visible(visible);
                slot.set_last_in_viewport(in_viewport);
            }
            out_events.push(Event::EnemySpawned {
                enemy,
                spawner,
                position,
            });
        }
        Command::MoveEnemy { enemy, position } => {
            let region = world.culling_region();
            let Some(slot) = world.pool.get_mut(enemy) else {
                return;
            };
            if slot.position() == position {
                return;
            }
            slot.set_position(position);

            let in_viewport = region.contains_point(position);
            if in_viewport || slot.last_in_viewport() {
                out_events.push(Event::EnemyMoved { enemy, position });
            }
            slot.set_last_in_viewport(in_viewport);
        }
        Command::DespawnEnemy { enemy } => {
            if let Some(spawner) = world.pool.release(enemy) {
                world.spawners.release_enemy(spawner);
                out_events.push(Event::EnemyDespawned { enemy, spawner });
            }
        }
        Command::RebuildSpatialIndex => {
            world.enemy_index.clear();
            let size = Vec2::splat(world.config.enemy_size);
            for slot in world.pool.active() {
                world.enemy_index.insert(
                    Rect::from_origin_and_size(slot.position(), size),
                    slot.id(),
                );
            }
        }
        Command::RevealEntities => {
            for spawner in world.spawners.iter_mut().filter(|state| !state.discovered) {
                let revealed = world
                    .fog
                    .chunk_at(spawner.origin)
                    .is_some_and(|chunk| chunk.visible);
                if revealed {
                    spawner.discovered = true;
                    out_events.push(Event::SpawnerDiscovered {
                        spawner: spawner.id,
                    });
                }
            }

            for slot in world.pool.active_mut() {
                let visible = world
                    .fog
                    .chunk_at(slot.position())
                    .is_some_and(|chunk| chunk.visible);
                if visible != slot.visible() {
                    slot.set_visible(visible);
                    out_events.push(Event::EnemyVisibilityChanged {
                        enemy: slot.id(),
                        visible,
                    });
                }
            }
        }
        Command::PlaceBuilding { kind, origin } => {
            let verdict = buildings::validate_placement(
                world.placement_rules(),
                origin,
                world.buildings.iter(),
            );
            match verdict {
                Ok(()) => {
                    let building = world.buildings.insert(kind, origin);
                    world.fog_dirty = true;
                    tracing::debug!(
                        building = building.get(),
                        kind = kind.index(),
                        total = world.buildings.len(),
                        "building placed"
                    );
                    out_events.push(Event::BuildingPlaced {
                        building,
                        kind,
                        origin,
                    });
                }
                Err(reason) => {
                    tracing::debug!(
                        ?reason,
                        x = origin.x,
                        y = origin.y,
                        "building placement rejected"
                    );
                    out_events.push(Event::BuildingPlacementRejected {
                        kind,
                        origin,
                        reason,
                    });
                }
            }
        }
    }
}

fn reject_spawn(spawner: SpawnerId, reason: SpawnRejection, out_events: &mut Vec<Event>) {
    tracing::debug!(spawner = spawner.get(), ?reason, "spawn request dropped");
    out_events.push(Event::SpawnDropped { spawner, reason });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use outpost_core::{
        config::WorldConfig, BuildingView, EnemyId, EnemySnapshot, EnemyView, FogView,
        PlacementError, Rect, SpawnerView, Vec2, VisionSource,
    };

    use super::{buildings, EnemyPool, World};

    /// Provides read-only access to the configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Top-left corner of the player footprint.
    #[must_use]
    pub fn player_position(world: &World) -> Vec2 {
        world.player
    }

    /// Footprint of the player.
    #[must_use]
    pub fn player_bounds(world: &World) -> Rect {
        Rect::from_origin_and_size(world.player, Vec2::splat(world.config.player_size))
    }

    /// Top-left offset of the viewport in world space.
    #[must_use]
    pub fn camera_offset(world: &World) -> Vec2 {
        world.camera.offset()
    }

    /// World-space rectangle covered by the viewport.
    #[must_use]
    pub fn viewport(world: &World) -> Rect {
        world.camera.rect()
    }

    /// Viewport grown by the culling buffer.
    #[must_use]
    pub fn culling_region(world: &World) -> Rect {
        world.culling_region()
    }

    /// Converts a screen-space point into world space.
    #[must_use]
    pub fn screen_to_world(world: &World, screen: Vec2) -> Vec2 {
        screen + world.camera.offset()
    }

    /// Snaps a world-space point down onto the placement grid.
    #[must_use]
    pub fn snap_to_grid(world: &World, point: Vec2) -> Vec2 {
        buildings::snap_to_grid(point, world.config.grid_size)
    }

    /// Checks whether a building could be placed at `origin` right now.
    pub fn validate_placement(world: &World, origin: Vec2) -> Result<(), PlacementError> {
        buildings::validate_placement(world.placement_rules(), origin, world.buildings.iter())
    }

    /// Number of ticks the world has processed.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether fog awaits a refresh.
    #[must_use]
    pub fn fog_pending(world: &World) -> bool {
        world.fog_dirty
    }

    /// Exposes a read-only view of the fog-of-war grid.
    #[must_use]
    pub fn fog_view(world: &World) -> FogView<'_> {
        world.fog.view()
    }

    /// Provides read-only access to the enemy pool.
    #[must_use]
    pub fn enemy_pool(world: &World) -> &EnemyPool {
        &world.pool
    }

    /// Captures a read-only view of the active enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .pool
                .active()
                .filter_map(|slot| {
                    slot.owner().map(|spawner| EnemySnapshot {
                        id: slot.id(),
                        spawner,
                        position: slot.position(),
                        visible: slot.visible(),
                    })
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the spawners.
    #[must_use]
    pub fn spawner_view(world: &World) -> SpawnerView {
        SpawnerView::from_snapshots(
            world
                .spawners
                .iter()
                .map(|state| state.snapshot())
                .collect(),
        )
    }

    /// Captures a read-only view of the placed buildings.
    #[must_use]
    pub fn building_view(world: &World) -> BuildingView {
        let step = world.config.construction_step;
        let steps = world.config.construction_steps;
        BuildingView::from_snapshots(
            world
                .buildings
                .iter()
                .map(|building| building.snapshot(step, steps))
                .collect(),
        )
    }

    /// Enumerates the vision sources fog is derived from, player first.
    #[must_use]
    pub fn vision_sources(world: &World) -> Vec<VisionSource> {
        let player_center = world.player + Vec2::splat(world.config.player_size / 2.0);
        let building_half = Vec2::splat(world.config.building_size / 2.0);
        std::iter::once(VisionSource::player(
            player_center,
            world.config.vision_chunk_radius,
        ))
        .chain(world.buildings.iter().map(|building| {
            VisionSource::building(
                building.origin + building_half,
                world.config.building_vision_chunk_radius,
            )
        }))
        .collect()
    }

    /// Lists the enemies whose indexed footprint overlaps `region`.
    ///
    /// Answers from the spatial index, which reflects positions as of the
    /// last index rebuild.
    #[must_use]
    pub fn enemies_in(world: &World, region: &Rect) -> Vec<EnemyId> {
        let mut enemies: Vec<EnemyId> = world
            .enemy_index
            .query(region)
            .into_iter()
            .map(|item| item.value)
            .collect();
        enemies.sort_unstable();
        enemies
    }
}
