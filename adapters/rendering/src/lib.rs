#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Outpost adapters.
//!
//! A [`Scene`] is captured once from the simulation and then kept current by
//! [`Scene::sync`], which refreshes the cheap layers from world queries and
//! moves enemy sprites only through the frame's published position updates.
//! Enemies outside the culling region therefore keep their last published
//! position until they come back into range.

use std::{collections::BTreeMap, time::Duration};

use anyhow::Result as AnyResult;
use glam::Vec2;
use outpost_core::{
    config::MINIMAP_SIZE, BuildingId, BuildingKind, ChunkState, EnemyId, Event, FogView, Rect,
    SpawnerId,
};
use outpost_system_builder::PlacementPreview;
use outpost_system_clock::{FrameReport, SimulationClock};
use outpost_world::query;
use thiserror::Error;

pub use outpost_core::FrameInput;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colors shared by every backend.
pub mod palette {
    use super::Color;

    /// Frame clear color.
    pub const BACKGROUND: Color = Color::from_rgb_u8(34, 40, 30);
    /// Player body.
    pub const PLAYER: Color = Color::from_rgb_u8(70, 130, 220);
    /// Enemy body.
    pub const ENEMY: Color = Color::from_rgb_u8(200, 60, 50);
    /// Discovered spawner footprint.
    pub const SPAWNER: Color = Color::from_rgb_u8(120, 40, 140);
    /// Ghost tint for a valid placement.
    pub const PREVIEW_VALID: Color = Color::new(0.2, 0.8, 0.2, 0.5);
    /// Ghost tint for an invalid placement.
    pub const PREVIEW_INVALID: Color = Color::new(0.9, 0.2, 0.2, 0.5);
    /// Outline of the build range around the player.
    pub const BUILD_RANGE: Color = Color::new(1.0, 1.0, 1.0, 0.25);
    /// Catalog colors indexed by building kind.
    pub const BUILDINGS: [Color; 3] = [
        Color::from_rgb_u8(150, 110, 60),
        Color::from_rgb_u8(110, 110, 120),
        Color::from_rgb_u8(60, 150, 140),
    ];
}

/// Color used for the provided catalog entry.
#[must_use]
pub fn building_color(kind: BuildingKind) -> Color {
    palette::BUILDINGS
        .get(usize::from(kind.index()))
        .copied()
        .unwrap_or(palette::BUILDINGS[0])
}

/// Fog overlay drawn over a single chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FogShade {
    /// Never seen; drawn fully opaque.
    Unexplored,
    /// Seen before but outside current vision; drawn dimmed.
    Explored,
    /// Inside current vision; drawn without overlay.
    Visible,
}

impl FogShade {
    fn classify(explored: bool, visible: bool) -> Self {
        if visible {
            Self::Visible
        } else if explored {
            Self::Explored
        } else {
            Self::Unexplored
        }
    }
}

/// Per-chunk fog overlay in row-major order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FogLayer {
    /// Number of chunk columns.
    pub columns: u32,
    /// Number of chunk rows.
    pub rows: u32,
    /// Side length of a chunk in world units.
    pub chunk_size: f32,
    /// Overlay shade per chunk.
    pub shades: Vec<FogShade>,
}

impl FogLayer {
    fn capture<F>(view: &FogView<'_>, is_visible: F) -> Self
    where
        F: Fn(&ChunkState) -> bool,
    {
        let (columns, rows) = view.dimensions();
        Self {
            columns,
            rows,
            chunk_size: view.chunk_size(),
            shades: view
                .iter()
                .map(|(_, state)| FogShade::classify(state.explored, is_visible(&state)))
                .collect(),
        }
    }

    /// Shade of the chunk containing `point`, if it lies inside the grid.
    #[must_use]
    pub fn shade_at(&self, point: Vec2) -> Option<FogShade> {
        if point.x < 0.0 || point.y < 0.0 || self.chunk_size <= 0.0 {
            return None;
        }
        let column = (point.x / self.chunk_size) as u32;
        let row = (point.y / self.chunk_size) as u32;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.shades
            .get((row * self.columns + column) as usize)
            .copied()
    }
}

/// Linear projection from world space onto the square minimap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimapProjection {
    scale: Vec2,
}

impl MinimapProjection {
    /// Creates a projection that fits `world_size` into a `size` square.
    pub fn new(world_size: Vec2, size: f32) -> Result<Self, RenderingError> {
        if world_size.x <= 0.0 || world_size.y <= 0.0 {
            return Err(RenderingError::InvalidWorldSize {
                width: world_size.x,
                height: world_size.y,
            });
        }
        Ok(Self {
            scale: Vec2::splat(size) / world_size,
        })
    }

    /// Projects a world position to minimap pixels.
    #[must_use]
    pub fn project(&self, point: Vec2) -> Vec2 {
        point * self.scale
    }

    /// Projects a world rectangle to minimap pixels.
    #[must_use]
    pub fn project_rect(&self, rect: &Rect) -> Rect {
        Rect::from_origin_and_size(self.project(rect.origin()), rect.size() * self.scale)
    }
}

/// Markers drawn on the minimap, already projected to minimap pixels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Minimap {
    /// Player marker.
    pub player: Vec2,
    /// Outline of the camera viewport.
    pub viewport: Rect,
    /// Enemies standing in a chunk revealed on the minimap.
    pub enemies: Vec<Vec2>,
    /// Discovered spawners.
    pub spawners: Vec<Vec2>,
    /// Every placed building.
    pub buildings: Vec<Vec2>,
    /// Minimap fog, driven by the minimap visibility layer.
    pub fog: FogLayer,
}

/// Enemy sprite state as last published by the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEnemy {
    /// Last published position.
    pub position: Vec2,
    /// Whether the enemy stands in a visible chunk.
    pub visible: bool,
}

/// Discovered spawner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSpawner {
    /// Spawner identifier.
    pub id: SpawnerId,
    /// World-space footprint.
    pub footprint: Rect,
}

/// Placed building together with its construction state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneBuilding {
    /// Building identifier.
    pub id: BuildingId,
    /// Catalog entry.
    pub kind: BuildingKind,
    /// World-space footprint.
    pub footprint: Rect,
    /// Construction progress in 0.0..=1.0.
    pub progress: f32,
    /// Fill color; unfinished buildings are drawn washed out.
    pub color: Color,
}

/// Ghost footprint under the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenePreview {
    /// Catalog entry being previewed.
    pub kind: BuildingKind,
    /// World-space footprint.
    pub footprint: Rect,
    /// Valid or invalid tint.
    pub color: Color,
}

impl From<&PlacementPreview> for ScenePreview {
    fn from(preview: &PlacementPreview) -> Self {
        Self {
            kind: preview.kind,
            footprint: preview.footprint,
            color: if preview.placeable {
                palette::PREVIEW_VALID
            } else {
                palette::PREVIEW_INVALID
            },
        }
    }
}

/// Stable key used to look up presentation objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    /// The player avatar.
    Player,
    /// A pooled enemy slot.
    Enemy(EnemyId),
    /// A spawner.
    Spawner(SpawnerId),
    /// A placed building.
    Building(BuildingId),
}

/// Scene description assembled from simulation queries.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// World region covered by the camera.
    pub viewport: Rect,
    /// Player footprint.
    pub player: Rect,
    /// Side length of an enemy sprite.
    pub enemy_size: f32,
    /// Number of pooled enemy slots that need a presentation object.
    pub enemy_capacity: usize,
    /// Enemy sprites keyed by pool slot.
    pub enemies: BTreeMap<EnemyId, SceneEnemy>,
    /// Spawners the player has discovered.
    pub spawners: Vec<SceneSpawner>,
    /// Placed buildings.
    pub buildings: Vec<SceneBuilding>,
    /// World-map fog overlay.
    pub fog: FogLayer,
    /// Minimap layer.
    pub minimap: Minimap,
    /// Region reachable for placement while a building is selected.
    pub build_range: Option<Rect>,
    /// Ghost under the pointer while a building is selected.
    pub preview: Option<ScenePreview>,
    projection: MinimapProjection,
}

impl Scene {
    /// Captures the full scene from the current simulation state.
    pub fn capture(clock: &SimulationClock) -> Result<Self, RenderingError> {
        let world = clock.world();
        let config = query::config(world);
        let projection =
            MinimapProjection::new(Vec2::new(config.width, config.height), MINIMAP_SIZE)?;
        let enemies = query::enemy_view(world)
            .iter()
            .map(|enemy| {
                (
                    enemy.id,
                    SceneEnemy {
                        position: enemy.position,
                        visible: enemy.visible,
                    },
                )
            })
            .collect();

        let mut scene = Self {
            viewport: Rect::default(),
            player: Rect::default(),
            enemy_size: config.enemy_size,
            enemy_capacity: query::enemy_pool(world).capacity(),
            enemies,
            spawners: Vec::new(),
            buildings: Vec::new(),
            fog: FogLayer::default(),
            minimap: Minimap::default(),
            build_range: None,
            preview: None,
            projection,
        };
        scene.refresh(clock, None);
        Ok(scene)
    }

    /// Brings the scene up to date after a simulation frame.
    pub fn sync(&mut self, clock: &SimulationClock, report: &FrameReport) {
        let pool = query::enemy_pool(clock.world());
        for event in &report.events {
            match event {
                Event::EnemySpawned {
                    enemy, position, ..
                } => {
                    let visible = pool.get(*enemy).is_some_and(|slot| slot.visible());
                    let _ = self.enemies.insert(
                        *enemy,
                        SceneEnemy {
                            position: *position,
                            visible,
                        },
                    );
                }
                Event::EnemyDespawned { enemy, .. } => {
                    let _ = self.enemies.remove(enemy);
                }
                Event::EnemyVisibilityChanged { enemy, visible } => {
                    if let Some(sprite) = self.enemies.get_mut(enemy) {
                        sprite.visible = *visible;
                    }
                }
                _ => {}
            }
        }
        for update in &report.position_updates {
            if let Some(sprite) = self.enemies.get_mut(&update.enemy) {
                sprite.position = update.position;
            }
        }
        self.refresh(clock, report.preview.as_ref());
    }

    fn refresh(&mut self, clock: &SimulationClock, preview: Option<&PlacementPreview>) {
        let world = clock.world();
        let config = query::config(world);
        let fog_view = query::fog_view(world);

        self.viewport = query::viewport(world);
        self.player = query::player_bounds(world);
        self.spawners = query::spawner_view(world)
            .iter()
            .filter(|spawner| spawner.discovered)
            .map(|spawner| SceneSpawner {
                id: spawner.id,
                footprint: Rect::from_origin_and_size(
                    spawner.origin,
                    Vec2::splat(config.spawner_size),
                ),
            })
            .collect();
        self.buildings = query::building_view(world)
            .iter()
            .map(|building| SceneBuilding {
                id: building.id,
                kind: building.kind,
                footprint: Rect::from_origin_and_size(
                    building.origin,
                    Vec2::splat(config.building_size),
                ),
                progress: building.progress,
                color: building_color(building.kind).lighten(0.6 * (1.0 - building.progress)),
            })
            .collect();
        self.fog = FogLayer::capture(&fog_view, |state| state.visible);
        self.build_range = clock.selected_building().map(|_| {
            let player = query::player_position(world);
            let reach = config.build_range;
            Rect::from_origin_and_size(
                player - Vec2::splat(reach),
                Vec2::splat(2.0 * reach + config.building_size),
            )
        });
        self.preview = preview.map(ScenePreview::from);

        let minimap_fog = FogLayer::capture(&fog_view, |state| state.minimap_visible);
        let half_enemy = Vec2::splat(self.enemy_size / 2.0);
        self.minimap = Minimap {
            player: self.projection.project(self.player.center()),
            viewport: self.projection.project_rect(&self.viewport),
            enemies: self
                .enemies
                .values()
                .map(|enemy| enemy.position + half_enemy)
                .filter(|center| minimap_fog.shade_at(*center) == Some(FogShade::Visible))
                .map(|center| self.projection.project(center))
                .collect(),
            spawners: self
                .spawners
                .iter()
                .map(|spawner| self.projection.project(spawner.footprint.center()))
                .collect(),
            buildings: self
                .buildings
                .iter()
                .map(|building| self.projection.project(building.footprint.center()))
                .collect(),
            fog: minimap_fog,
        };
    }

    /// Enemy sprites that should be drawn on the world map this frame.
    pub fn drawable_enemies(&self) -> impl Iterator<Item = (EnemyId, &SceneEnemy)> + '_ {
        let culling = self.viewport;
        self.enemies.iter().filter_map(move |(id, enemy)| {
            (enemy.visible && culling.contains_point(enemy.position)).then_some((*id, enemy))
        })
    }

    /// Keys of every presentation object the scene can reference.
    ///
    /// Enemy slots are listed for the whole pool since sprites are created up
    /// front and reused.
    pub fn required_handles(&self) -> impl Iterator<Item = EntityKey> + '_ {
        let capacity = u32::try_from(self.enemy_capacity).unwrap_or(u32::MAX);
        std::iter::once(EntityKey::Player)
            .chain((0..capacity).map(|slot| EntityKey::Enemy(EnemyId::new(slot))))
            .chain(
                self.spawners
                    .iter()
                    .map(|spawner| EntityKey::Spawner(spawner.id)),
            )
            .chain(
                self.buildings
                    .iter()
                    .map(|building| EntityKey::Building(building.id)),
            )
    }
}

/// Table mapping stable entity keys to backend-specific presentation handles.
#[derive(Clone, Debug)]
pub struct RenderHandles<H> {
    handles: BTreeMap<EntityKey, H>,
}

impl<H> Default for RenderHandles<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RenderHandles<H> {
    /// Creates an empty handle table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handles: BTreeMap::new(),
        }
    }

    /// Registers a handle, returning the handle it replaced.
    pub fn insert(&mut self, key: EntityKey, handle: H) -> Option<H> {
        self.handles.insert(key, handle)
    }

    /// Looks up the handle registered for `key`.
    #[must_use]
    pub fn get(&self, key: EntityKey) -> Option<&H> {
        self.handles.get(&key)
    }

    /// Number of registered handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Reports whether no handle is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Creates handles for keys that have none yet and returns how many were
    /// created.
    pub fn register_missing<I, F>(&mut self, keys: I, mut create: F) -> usize
    where
        I: IntoIterator<Item = EntityKey>,
        F: FnMut(EntityKey) -> H,
    {
        let mut created = 0;
        for key in keys {
            let _ = self.handles.entry(key).or_insert_with(|| {
                created += 1;
                create(key)
            });
        }
        created
    }

    /// Fails on the first key without a registered handle.
    pub fn ensure_complete<I>(&self, keys: I) -> Result<(), RenderingError>
    where
        I: IntoIterator<Item = EntityKey>,
    {
        match keys.into_iter().find(|key| !self.handles.contains_key(key)) {
            Some(key) => Err(RenderingError::MissingHandle { key }),
            None => Ok(()),
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Outpost scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta,
    /// per-frame input captured by the adapter, and may mutate the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors raised while preparing presentation state.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum RenderingError {
    /// A scene entity has no presentation object.
    #[error("no presentation handle registered for {key:?}")]
    MissingHandle {
        /// Key that failed the lookup.
        key: EntityKey,
    },
    /// The minimap cannot project a degenerate world.
    #[error("world size must be positive (received {width}x{height})")]
    InvalidWorldSize {
        /// Provided world width.
        width: f32,
        /// Provided world height.
        height: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_maps_the_world_onto_the_minimap_square() {
        let projection = MinimapProjection::new(Vec2::new(4000.0, 4000.0), MINIMAP_SIZE)
            .expect("positive world");

        assert_eq!(
            projection.project(Vec2::new(2000.0, 4000.0)),
            Vec2::new(100.0, 200.0)
        );
        assert_eq!(
            projection.project_rect(&Rect::new(1360.0, 1640.0, 1280.0, 720.0)),
            Rect::new(68.0, 82.0, 64.0, 36.0)
        );
    }

    #[test]
    fn projection_rejects_empty_worlds() {
        assert_eq!(
            MinimapProjection::new(Vec2::new(0.0, 100.0), MINIMAP_SIZE),
            Err(RenderingError::InvalidWorldSize {
                width: 0.0,
                height: 100.0,
            })
        );
    }

    #[test]
    fn ensure_complete_reports_the_first_missing_key() {
        let mut handles = RenderHandles::new();
        let _ = handles.insert(EntityKey::Player, 0_u32);

        let missing = EntityKey::Enemy(EnemyId::new(0));
        assert_eq!(
            handles.ensure_complete([EntityKey::Player, missing]),
            Err(RenderingError::MissingHandle { key: missing })
        );
        assert_eq!(handles.ensure_complete([EntityKey::Player]), Ok(()));
    }

    #[test]
    fn register_missing_keeps_existing_handles() {
        let mut handles = RenderHandles::new();
        let _ = handles.insert(EntityKey::Player, 7_u32);

        let created = handles.register_missing(
            [EntityKey::Player, EntityKey::Building(BuildingId::new(0))],
            |_| 1,
        );

        assert_eq!(created, 1);
        assert_eq!(handles.get(EntityKey::Player), Some(&7));
        assert_eq!(handles.len(), 2);
    }

    #[test]
    fn fog_shade_prefers_visibility_over_exploration() {
        assert_eq!(FogShade::classify(true, true), FogShade::Visible);
        assert_eq!(FogShade::classify(true, false), FogShade::Explored);
        assert_eq!(FogShade::classify(false, false), FogShade::Unexplored);
    }

    #[test]
    fn unfinished_buildings_are_washed_out() {
        let base = building_color(BuildingKind::from_index(0).expect("catalog entry"));
        let faded = base.lighten(0.6);
        assert!(faded.red > base.red && faded.green > base.green);
        assert_eq!(base.lighten(0.0), base);
    }
}
