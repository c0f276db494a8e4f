//! Camera offset and viewport bookkeeping.

use outpost_core::{MovementAxes, Rect, Vec2};

/// Top-left offset of the viewport, clamped to the world extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Camera {
    offset: Vec2,
    viewport: Vec2,
    world: Vec2,
}

impl Camera {
    pub(crate) fn new(world: Vec2, viewport: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport: viewport.max(Vec2::ZERO),
            world,
        }
    }

    pub(crate) const fn offset(&self) -> Vec2 {
        self.offset
    }

    pub(crate) const fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// World-space rectangle currently shown on screen.
    pub(crate) const fn rect(&self) -> Rect {
        Rect::from_origin_and_size(self.offset, self.viewport)
    }

    /// Centres the viewport on `target`. Returns whether the offset changed.
    pub(crate) fn center_on(&mut self, target: Vec2) -> bool {
        self.move_to(target - self.viewport / 2.0)
    }

    /// Shifts the viewport `speed` units along each active edge.
    pub(crate) fn scroll(&mut self, edges: MovementAxes, speed: f32) -> bool {
        self.move_to(self.offset + edges.step(speed))
    }

    /// Adopts new viewport dimensions and re-clamps the offset.
    pub(crate) fn resize(&mut self, viewport: Vec2) -> bool {
        let viewport = viewport.max(Vec2::ZERO);
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        let _ = self.move_to(self.offset);
        true
    }

    fn move_to(&mut self, requested: Vec2) -> bool {
        let clamped = self.clamp(requested);
        if clamped == self.offset {
            return false;
        }
        self.offset = clamped;
        true
    }

    fn clamp(&self, offset: Vec2) -> Vec2 {
        let limit = self.world - self.viewport;
        Vec2::new(
            offset.x.min(limit.x).max(0.0),
            offset.y.min(limit.y).max(0.0),
        )
    }
}
