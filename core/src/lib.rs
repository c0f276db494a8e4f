#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Outpost simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod geometry;

pub use geometry::{chebyshev_distance, ChunkCoord, MovementAxes, Rect};
pub use glam::Vec2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Moves the player along the held axes, clamped to the world.
    MovePlayer {
        /// Direction flags held this frame.
        movement: MovementAxes,
        /// Whether the speed modifier is held.
        sprint: bool,
    },
    /// Centres the camera on the player.
    CenterCamera,
    /// Scrolls the camera along the provided edges.
    ScrollCamera {
        /// Edges the pointer is resting against.
        edges: MovementAxes,
    },
    /// Reports new viewport dimensions from the presentation layer.
    ResizeViewport {
        /// Viewport width in world units.
        width: f32,
        /// Viewport height in world units.
        height: f32,
    },
    /// Recomputes fog-of-war if anything affecting it changed since the last pass.
    RefreshFog,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Registers a spawner anchored at the provided top-left position.
    CreateSpawner {
        /// Top-left corner of the spawner footprint.
        origin: Vec2,
    },
    /// Requests that a spawner emit an enemy at the provided position.
    SpawnEnemy {
        /// Spawner responsible for the enemy.
        spawner: SpawnerId,
        /// World position the enemy appears at.
        position: Vec2,
    },
    /// Moves an active enemy to a new position.
    MoveEnemy {
        /// Enemy to move.
        enemy: EnemyId,
        /// Destination position.
        position: Vec2,
    },
    /// Returns an enemy to the pool.
    DespawnEnemy {
        /// Enemy to release.
        enemy: EnemyId,
    },
    /// Rebuilds the enemy spatial index from current positions.
    RebuildSpatialIndex,
    /// Derives spawner discovery and enemy visibility from the current fog.
    RevealEntities,
    /// Requests placement of a building anchored at the provided origin.
    PlaceBuilding {
        /// Kind of building to construct.
        kind: BuildingKind,
        /// Top-left corner of the building footprint.
        origin: Vec2,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the player changed position.
    PlayerMoved {
        /// Position before the move.
        from: Vec2,
        /// Position after the move and clamping.
        to: Vec2,
    },
    /// Confirms that the camera offset changed.
    CameraMoved {
        /// New top-left offset of the viewport.
        offset: Vec2,
    },
    /// Confirms that the viewport changed size.
    ViewportResized {
        /// New viewport dimensions.
        size: Vec2,
    },
    /// Reports a completed fog-of-war pass.
    FogRecomputed {
        /// Number of chunks visible on the world map after the pass.
        visible_chunks: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a spawner was registered.
    SpawnerCreated {
        /// Identifier assigned to the spawner.
        spawner: SpawnerId,
        /// Top-left corner of the spawner footprint.
        origin: Vec2,
    },
    /// Confirms that a spawner emitted an enemy.
    EnemySpawned {
        /// Pool slot occupied by the enemy.
        enemy: EnemyId,
        /// Spawner credited with the enemy.
        spawner: SpawnerId,
        /// Initial position of the enemy.
        position: Vec2,
    },
    /// Reports that a spawn request was dropped.
    SpawnDropped {
        /// Spawner that requested the enemy.
        spawner: SpawnerId,
        /// Why the request was dropped.
        reason: SpawnRejection,
    },
    /// Publishes an enemy position to the presentation layer.
    ///
    /// Emitted only while the enemy is inside the culling region, plus once
    /// on the tick it leaves it.
    EnemyMoved {
        /// Enemy that moved.
        enemy: EnemyId,
        /// Position after the move.
        position: Vec2,
    },
    /// Confirms that an enemy returned to the pool.
    EnemyDespawned {
        /// Released pool slot.
        enemy: EnemyId,
        /// Spawner whose count was decremented.
        spawner: SpawnerId,
    },
    /// Reports that an enemy entered or left visible fog.
    EnemyVisibilityChanged {
        /// Enemy whose visibility changed.
        enemy: EnemyId,
        /// Whether the enemy is now visible.
        visible: bool,
    },
    /// Reports that a spawner was revealed for the first time.
    SpawnerDiscovered {
        /// Newly discovered spawner.
        spawner: SpawnerId,
    },
    /// Confirms that a building was placed into the world.
    BuildingPlaced {
        /// Identifier assigned to the building.
        building: BuildingId,
        /// Kind of building placed.
        kind: BuildingKind,
        /// Top-left corner of the footprint.
        origin: Vec2,
    },
    /// Reports that a building placement request was rejected.
    BuildingPlacementRejected {
        /// Kind of building requested.
        kind: BuildingKind,
        /// Origin provided in the request.
        origin: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a building finished its construction animation.
    ConstructionCompleted {
        /// Building that completed.
        building: BuildingId,
    },
}

/// Unique identifier of an enemy pool slot.
///
/// Slots live for the whole session, so the identifier is stable and may key
/// presentation handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a spawner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpawnerId(u32);

impl SpawnerId {
    /// Creates a new spawner identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildingId(u32);

impl BuildingId {
    /// Creates a new building identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Entry of the building catalog, selected by hotkey.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildingKind(u8);

impl BuildingKind {
    /// Resolves a catalog index, rejecting indices past the catalog end.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < config::BUILDING_CATALOG_LEN {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Resolves a one-based hotkey (`1`..=`3`) to its catalog entry.
    #[must_use]
    pub const fn from_hotkey(key: u8) -> Option<Self> {
        if key == 0 {
            return None;
        }
        Self::from_index(key - 1)
    }

    /// Zero-based catalog index of the kind.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.0
    }
}

/// Reasons a spawn request may be dropped by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnRejection {
    /// Every pool slot is active.
    PoolExhausted,
    /// The spawner already owns its maximum number of enemies.
    SpawnerAtCapacity,
    /// No spawner with the provided identifier exists.
    UnknownSpawner,
}

/// Reasons a building placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementError {
    /// The origin does not lie on the placement grid.
    Misaligned,
    /// The footprint extends beyond the world bounds.
    OutOfBounds,
    /// The origin lies beyond the build range of the player.
    OutOfRange,
    /// The footprint overlaps an existing building.
    Occupied,
}

/// How a vision source reveals the two fog layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisionReach {
    /// Reveals the world map and the minimap unconditionally.
    Always,
    /// Reveals the minimap unconditionally but the world map only inside the viewport.
    ViewportGated,
}

/// Entity granting chunk visibility within a Chebyshev chunk radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisionSource {
    /// World position vision is measured from.
    pub center: Vec2,
    /// Chebyshev radius in chunks.
    pub radius: u32,
    /// Which fog layers the source reveals.
    pub reach: VisionReach,
}

impl VisionSource {
    /// Vision granted by the player.
    #[must_use]
    pub const fn player(center: Vec2, radius: u32) -> Self {
        Self {
            center,
            radius,
            reach: VisionReach::Always,
        }
    }

    /// Vision granted by a building.
    #[must_use]
    pub const fn building(center: Vec2, radius: u32) -> Self {
        Self {
            center,
            radius,
            reach: VisionReach::ViewportGated,
        }
    }
}

/// Visibility flags of a single fog chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkState {
    /// The chunk has been visible on either layer at least once.
    pub explored: bool,
    /// The chunk is visible on the world map.
    pub visible: bool,
    /// The chunk is visible on the minimap.
    pub minimap_visible: bool,
}

/// Read-only view into the fog-of-war grid.
#[derive(Clone, Copy, Debug)]
pub struct FogView<'a> {
    chunks: &'a [ChunkState],
    columns: u32,
    rows: u32,
    chunk_size: f32,
}

impl<'a> FogView<'a> {
    /// Captures a new fog view backed by the provided row-major chunk slice.
    #[must_use]
    pub fn new(chunks: &'a [ChunkState], columns: u32, rows: u32, chunk_size: f32) -> Self {
        Self {
            chunks,
            columns,
            rows,
            chunk_size,
        }
    }

    /// Returns the state of the provided chunk, if it lies inside the grid.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<ChunkState> {
        if coord.column() >= self.columns || coord.row() >= self.rows {
            return None;
        }
        let row = usize::try_from(coord.row()).ok()?;
        let column = usize::try_from(coord.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        self.chunks.get(row * width + column).copied()
    }

    /// Returns the state of the chunk containing `point`.
    #[must_use]
    pub fn chunk_at(&self, point: Vec2) -> Option<ChunkState> {
        ChunkCoord::containing(point, self.chunk_size).and_then(|coord| self.chunk(coord))
    }

    /// Iterates every chunk together with its coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, ChunkState)> + 'a {
        let columns = self.columns.max(1);
        self.chunks.iter().enumerate().map(move |(index, state)| {
            let index = index as u32;
            (ChunkCoord::new(index % columns, index / columns), *state)
        })
    }

    /// Provides the dimensions of the grid in chunks.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Side length of a chunk in world units.
    #[must_use]
    pub const fn chunk_size(&self) -> f32 {
        self.chunk_size
    }
}

/// Immutable representation of an active enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Pool slot occupied by the enemy.
    pub id: EnemyId,
    /// Spawner credited with the enemy.
    pub spawner: SpawnerId,
    /// Current world position.
    pub position: Vec2,
    /// Whether the enemy stands in visible fog.
    pub visible: bool,
}

/// Read-only snapshot describing all active enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of active enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a spawner used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnerSnapshot {
    /// Identifier assigned to the spawner.
    pub id: SpawnerId,
    /// Top-left corner of the spawner footprint.
    pub origin: Vec2,
    /// Number of live enemies credited to the spawner.
    pub active_enemies: u32,
    /// Whether the spawner has ever been revealed.
    pub discovered: bool,
}

/// Read-only snapshot describing every spawner.
#[derive(Clone, Debug, Default)]
pub struct SpawnerView {
    snapshots: Vec<SpawnerSnapshot>,
}

impl SpawnerView {
    /// Creates a new spawner view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SpawnerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &SpawnerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single spawner.
    #[must_use]
    pub fn get(&self, id: SpawnerId) -> Option<&SpawnerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<SpawnerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a building used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingSnapshot {
    /// Identifier assigned to the building.
    pub id: BuildingId,
    /// Kind of building.
    pub kind: BuildingKind,
    /// Top-left corner of the footprint.
    pub origin: Vec2,
    /// Cosmetic construction progress in `0.0..=1.0`.
    pub progress: f32,
}

/// Read-only snapshot describing every building.
#[derive(Clone, Debug, Default)]
pub struct BuildingView {
    snapshots: Vec<BuildingSnapshot>,
}

impl BuildingView {
    /// Creates a new building view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BuildingSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &BuildingSnapshot> {
        self.snapshots.iter()
    }
}

/// Latest enemy position queued for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionUpdate {
    /// Enemy whose presentation should move.
    pub enemy: EnemyId,
    /// Position to present.
    pub position: Vec2,
}

/// Discrete intents gathered by the input layer for a single frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameInput {
    /// Movement axes held this frame.
    pub movement: MovementAxes,
    /// Whether the speed modifier is held.
    pub sprint: bool,
    /// Whether the camera-follow toggle was pressed this frame.
    pub toggle_follow: bool,
    /// Whether the hold-to-center input is held.
    pub hold_center: bool,
    /// Pointer position in screen space, if the pointer is over the viewport.
    pub pointer: Option<Vec2>,
    /// One-based building hotkey pressed this frame.
    pub select_building: Option<u8>,
    /// Whether the player clicked to place the selected building.
    pub confirm_placement: bool,
    /// Whether the player cancelled the current selection.
    pub cancel_selection: bool,
}
