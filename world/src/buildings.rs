//! Authoritative building state and placement validation.

use std::{collections::BTreeMap, time::Duration};

use outpost_core::{
    chebyshev_distance, BuildingId, BuildingKind, BuildingSnapshot, Event, PlacementError, Rect,
    Vec2,
};

/// Tolerance applied when checking grid alignment of floating-point origins.
const ALIGNMENT_EPSILON: f32 = 1e-3;

/// Snapshot of a building stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct BuildingState {
    /// Identifier allocated by the world for the building.
    pub(crate) id: BuildingId,
    /// Kind of building that was placed.
    pub(crate) kind: BuildingKind,
    /// Top-left corner of the footprint.
    pub(crate) origin: Vec2,
    /// Construction time accumulated so far.
    elapsed: Duration,
    completed: bool,
}

impl BuildingState {
    fn new(id: BuildingId, kind: BuildingKind, origin: Vec2) -> Self {
        Self {
            id,
            kind,
            origin,
            elapsed: Duration::ZERO,
            completed: false,
        }
    }

    /// Footprint of the building given the configured side length.
    pub(crate) fn footprint(&self, size: f32) -> Rect {
        Rect::from_origin_and_size(self.origin, Vec2::splat(size))
    }

    /// Construction progress in `0.0..=1.0`, quantised to whole steps.
    pub(crate) fn progress(&self, step: Duration, steps: u32) -> f32 {
        if steps == 0 || step.is_zero() {
            return 1.0;
        }
        let taken = (self.elapsed.as_nanos() / step.as_nanos()).min(u128::from(steps));
        taken as f32 / steps as f32
    }

    pub(crate) fn snapshot(&self, step: Duration, steps: u32) -> BuildingSnapshot {
        BuildingSnapshot {
            id: self.id,
            kind: self.kind,
            origin: self.origin,
            progress: self.progress(step, steps),
        }
    }
}

/// Registry that stores buildings and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct BuildingRegistry {
    entries: BTreeMap<BuildingId, BuildingState>,
    next_building_id: BuildingId,
}

impl BuildingRegistry {
    /// Creates an empty building registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_building_id: BuildingId::new(0),
        }
    }

    /// Stores a new building and returns the identifier assigned to it.
    pub(crate) fn insert(&mut self, kind: BuildingKind, origin: Vec2) -> BuildingId {
        let id = self.next_building_id;
        self.next_building_id = BuildingId::new(id.get().saturating_add(1));
        let state = BuildingState::new(id, kind, origin);
        let _ = self.entries.insert(id, state);
        id
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &BuildingState> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Accrues construction time and reports buildings that just finished.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        step: Duration,
        steps: u32,
        out_events: &mut Vec<Event>,
    ) {
        for building in self.entries.values_mut().filter(|entry| !entry.completed) {
            building.elapsed = building.elapsed.saturating_add(dt);
            if building.progress(step, steps) >= 1.0 {
                building.completed = true;
                out_events.push(Event::ConstructionCompleted {
                    building: building.id,
                });
            }
        }
    }
}

/// Inputs required to validate a placement request.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlacementRules {
    pub(crate) world: Rect,
    pub(crate) grid_size: f32,
    pub(crate) build_range: f32,
    pub(crate) building_size: f32,
    pub(crate) player: Vec2,
}

/// Checks a placement request against the grid, the world, the player and
/// every existing building, in that order.
pub(crate) fn validate_placement<'a>(
    rules: PlacementRules,
    origin: Vec2,
    existing: impl IntoIterator<Item = &'a BuildingState>,
) -> Result<(), PlacementError> {
    if !is_aligned(origin.x, rules.grid_size) || !is_aligned(origin.y, rules.grid_size) {
        return Err(PlacementError::Misaligned);
    }

    let footprint = Rect::from_origin_and_size(origin, Vec2::splat(rules.building_size));
    if !rules.world.contains_rect(&footprint) {
        return Err(PlacementError::OutOfBounds);
    }

    if chebyshev_distance(origin, rules.player) > rules.build_range {
        return Err(PlacementError::OutOfRange);
    }

    if existing
        .into_iter()
        .any(|building| building.footprint(rules.building_size).overlaps(&footprint))
    {
        return Err(PlacementError::Occupied);
    }

    Ok(())
}

/// Snaps a world-space point down onto the placement grid.
pub(crate) fn snap_to_grid(point: Vec2, grid_size: f32) -> Vec2 {
    if grid_size <= 0.0 {
        return point;
    }
    (point / grid_size).floor() * grid_size
}

fn is_aligned(value: f32, grid_size: f32) -> bool {
    if grid_size <= 0.0 || !value.is_finite() {
        return false;
    }
    let remainder = value.rem_euclid(grid_size);
    remainder <= ALIGNMENT_EPSILON || grid_size - remainder <= ALIGNMENT_EPSILON
}
