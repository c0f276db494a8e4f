#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure building-placement system that tracks the selected catalog entry and
//! emits placement commands.

use outpost_core::{BuildingKind, Command, Rect, Vec2};

/// Declarative placement preview describing a potential building.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementPreview {
    /// Kind of building proposed for placement.
    pub kind: BuildingKind,
    /// Grid-snapped origin of the proposed footprint.
    pub origin: Vec2,
    /// Region the building would occupy if placed.
    pub footprint: Rect,
    /// Indicates whether the preview represents a valid placement location.
    pub placeable: bool,
}

impl PlacementPreview {
    /// Creates a new placement preview descriptor.
    #[must_use]
    pub const fn new(kind: BuildingKind, origin: Vec2, footprint: Rect, placeable: bool) -> Self {
        Self {
            kind,
            origin,
            footprint,
            placeable,
        }
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Catalog entry whose hotkey was pressed this frame.
    pub select: Option<BuildingKind>,
    /// Indicates whether the player cancelled the selection this frame.
    pub cancel: bool,
    /// Indicates whether the player confirmed a placement this frame.
    pub confirm: bool,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(select: Option<BuildingKind>, cancel: bool, confirm: bool) -> Self {
        Self {
            select,
            cancel,
            confirm,
        }
    }
}

/// Placement system that translates selection, preview and input into
/// placement commands.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    selected: Option<BuildingKind>,
}

impl Builder {
    /// Creates a new builder system with nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    /// Catalog entry currently selected for placement.
    #[must_use]
    pub const fn selected(&self) -> Option<BuildingKind> {
        self.selected
    }

    /// Applies cancellation and hotkey toggles.
    ///
    /// Selecting the entry that is already selected clears the selection;
    /// selecting a different entry replaces it.
    pub fn update_selection(&mut self, input: BuilderInput) {
        if input.cancel {
            self.selected = None;
        }
        if let Some(kind) = input.select {
            self.selected = if self.selected == Some(kind) {
                None
            } else {
                Some(kind)
            };
        }
    }

    /// Builds the placement preview for a snapped origin.
    ///
    /// The `is_placeable` closure should mirror the world's
    /// `query::validate_placement` helper.
    pub fn preview<F>(
        &self,
        origin: Option<Vec2>,
        building_size: f32,
        mut is_placeable: F,
    ) -> Option<PlacementPreview>
    where
        F: FnMut(Vec2) -> bool,
    {
        let kind = self.selected?;
        let origin = origin?;
        let footprint = Rect::from_origin_and_size(origin, Vec2::splat(building_size));
        Some(PlacementPreview::new(
            kind,
            origin,
            footprint,
            is_placeable(origin),
        ))
    }

    /// Emits a placement command when the player confirms a valid preview.
    ///
    /// The selection stays active after placement so several buildings of
    /// the same kind can be placed in a row.
    pub fn handle(
        &self,
        preview: Option<PlacementPreview>,
        input: BuilderInput,
        out: &mut Vec<Command>,
    ) {
        if !input.confirm {
            return;
        }
        if let Some(preview) = preview.filter(|preview| preview.placeable) {
            out.push(Command::PlaceBuilding {
                kind: preview.kind,
                origin: preview.origin,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(index: u8) -> BuildingKind {
        BuildingKind::from_index(index).expect("catalog entry")
    }

    #[test]
    fn reselecting_the_same_entry_clears_the_selection() {
        let mut builder = Builder::new();
        builder.update_selection(BuilderInput::new(Some(kind(0)), false, false));
        assert_eq!(builder.selected(), Some(kind(0)));

        builder.update_selection(BuilderInput::new(Some(kind(1)), false, false));
        assert_eq!(builder.selected(), Some(kind(1)));

        builder.update_selection(BuilderInput::new(Some(kind(1)), false, false));
        assert_eq!(builder.selected(), None);
    }

    #[test]
    fn cancel_clears_the_selection() {
        let mut builder = Builder::new();
        builder.update_selection(BuilderInput::new(Some(kind(2)), false, false));
        builder.update_selection(BuilderInput::new(None, true, false));
        assert_eq!(builder.selected(), None);
    }

    #[test]
    fn no_preview_without_selection() {
        let builder = Builder::new();
        assert!(builder.preview(Some(Vec2::ZERO), 100.0, |_| true).is_none());
    }
}
