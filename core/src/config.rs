//! Build-time tuning constants and the world configuration derived from them.

use std::time::Duration;

use glam::Vec2;

use crate::geometry::Rect;

/// Horizontal extent of the world in world units.
pub const WORLD_WIDTH: f32 = 4000.0;
/// Vertical extent of the world in world units.
pub const WORLD_HEIGHT: f32 = 4000.0;
/// Side length of a fog-of-war chunk.
pub const CHUNK_SIZE: f32 = 100.0;
/// Snap increment for building placement.
pub const GRID_SIZE: f32 = 50.0;
/// Maximum Chebyshev distance between the player and a building origin.
pub const BUILD_RANGE: f32 = 200.0;
/// Chebyshev radius, in chunks, revealed around the player.
pub const VISION_CHUNK_RADIUS: u32 = 3;
/// Chebyshev radius, in chunks, revealed around each building.
pub const BUILDING_VISION_CHUNK_RADIUS: u32 = 2;
/// Side length of the player's square footprint.
pub const PLAYER_SIZE: f32 = 50.0;
/// Player displacement per frame along each held axis.
pub const PLAYER_SPEED: f32 = 5.0;
/// Factor applied to the player speed while the speed modifier is held.
pub const SPRINT_MULTIPLIER: f32 = 2.0;
/// Enemy displacement per tick toward the player.
pub const ENEMY_SPEED: f32 = 2.0;
/// Side length of the square footprint indexed for each enemy.
pub const ENEMY_SIZE: f32 = 30.0;
/// Camera displacement per tick along each active edge.
pub const CAMERA_SPEED: f32 = 15.0;
/// Distance from a screen edge, in pixels, that triggers edge scrolling.
pub const EDGE_SCROLL_THRESHOLD: f32 = 20.0;
/// Default viewport width used until the presentation layer reports one.
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
/// Default viewport height used until the presentation layer reports one.
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;
/// Margin around the viewport inside which enemies stay presentation-active.
pub const VIEWPORT_BUFFER: f32 = 200.0;
/// Interval between successive emissions of a single spawner.
pub const SPAWN_INTERVAL: Duration = Duration::from_millis(3000);
/// Upper bound on the number of spawners placed at world-init.
pub const MAX_SPAWNERS: usize = 4;
/// Minimum separation between spawners and from the player start.
pub const MIN_SPAWNER_DISTANCE: f32 = 800.0;
/// Sampling attempts allotted to each spawner during placement.
pub const SPAWNER_PLACEMENT_ATTEMPTS: u32 = 100;
/// Keep-out margin between spawner origins and the world edge.
pub const SPAWNER_EDGE_MARGIN: f32 = 100.0;
/// Maximum number of live enemies attributed to a single spawner.
pub const MAX_ENEMIES_PER_SPAWNER: u32 = 3;
/// Radius of the circle around a spawner centre on which enemies appear.
pub const SPAWN_RADIUS: f32 = 100.0;
/// Number of reusable enemy slots.
pub const ENEMY_POOL_SIZE: usize = 50;
/// Side length of a spawner's square footprint.
pub const SPAWNER_SIZE: f32 = 100.0;
/// Side length of a building's square footprint.
pub const BUILDING_SIZE: f32 = 100.0;
/// Number of selectable building kinds.
pub const BUILDING_CATALOG_LEN: u8 = 3;
/// Duration of a single construction animation step.
pub const CONSTRUCTION_STEP: Duration = Duration::from_millis(200);
/// Number of steps until construction completes.
pub const CONSTRUCTION_STEPS: u32 = 10;
/// Side length of the square minimap in pixels.
pub const MINIMAP_SIZE: f32 = 200.0;
/// Items a quadtree node holds before it splits.
pub const QUADTREE_MAX_OBJECTS: usize = 10;
/// Maximum depth of the quadtree.
pub const QUADTREE_MAX_LEVELS: u32 = 4;

/// Parameters describing a simulated world.
///
/// `Default` mirrors the build-time constants; smaller worlds are only
/// constructed by tests and tooling.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Horizontal world extent.
    pub width: f32,
    /// Vertical world extent.
    pub height: f32,
    /// Side length of a fog-of-war chunk.
    pub chunk_size: f32,
    /// Building placement snap increment.
    pub grid_size: f32,
    /// Maximum Chebyshev distance between the player and a building origin.
    pub build_range: f32,
    /// Player vision radius in chunks.
    pub vision_chunk_radius: u32,
    /// Building vision radius in chunks.
    pub building_vision_chunk_radius: u32,
    /// Player footprint side length.
    pub player_size: f32,
    /// Player displacement per frame.
    pub player_speed: f32,
    /// Multiplier applied while sprinting.
    pub sprint_multiplier: f32,
    /// Camera displacement per tick while edge scrolling.
    pub camera_speed: f32,
    /// Initial viewport dimensions.
    pub viewport: Vec2,
    /// Culling margin around the viewport.
    pub viewport_buffer: f32,
    /// Number of enemy pool slots.
    pub pool_size: usize,
    /// Per-spawner live enemy cap.
    pub max_enemies_per_spawner: u32,
    /// Enemy footprint side length used by the spatial index.
    pub enemy_size: f32,
    /// Spawner footprint side length.
    pub spawner_size: f32,
    /// Building footprint side length.
    pub building_size: f32,
    /// Duration of one construction step.
    pub construction_step: Duration,
    /// Steps until construction completes.
    pub construction_steps: u32,
    /// Quadtree node capacity.
    pub quadtree_max_objects: usize,
    /// Quadtree depth cap.
    pub quadtree_max_levels: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            chunk_size: CHUNK_SIZE,
            grid_size: GRID_SIZE,
            build_range: BUILD_RANGE,
            vision_chunk_radius: VISION_CHUNK_RADIUS,
            building_vision_chunk_radius: BUILDING_VISION_CHUNK_RADIUS,
            player_size: PLAYER_SIZE,
            player_speed: PLAYER_SPEED,
            sprint_multiplier: SPRINT_MULTIPLIER,
            camera_speed: CAMERA_SPEED,
            viewport: Vec2::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            viewport_buffer: VIEWPORT_BUFFER,
            pool_size: ENEMY_POOL_SIZE,
            max_enemies_per_spawner: MAX_ENEMIES_PER_SPAWNER,
            enemy_size: ENEMY_SIZE,
            spawner_size: SPAWNER_SIZE,
            building_size: BUILDING_SIZE,
            construction_step: CONSTRUCTION_STEP,
            construction_steps: CONSTRUCTION_STEPS,
            quadtree_max_objects: QUADTREE_MAX_OBJECTS,
            quadtree_max_levels: QUADTREE_MAX_LEVELS,
        }
    }
}

impl WorldConfig {
    /// Rectangle covering the whole world.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Position the player occupies when the session starts.
    #[must_use]
    pub fn player_start(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Number of chunk columns covering the world.
    #[must_use]
    pub fn chunk_columns(&self) -> u32 {
        chunk_count(self.width, self.chunk_size)
    }

    /// Number of chunk rows covering the world.
    #[must_use]
    pub fn chunk_rows(&self) -> u32 {
        chunk_count(self.height, self.chunk_size)
    }
}

fn chunk_count(extent: f32, chunk_size: f32) -> u32 {
    if chunk_size <= 0.0 || extent <= 0.0 {
        return 0;
    }
    (extent / chunk_size).ceil() as u32
}
