#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Camera control system translating follow, hold-to-center and edge-scroll
//! intents into camera commands.

use outpost_core::{config::EDGE_SCROLL_THRESHOLD, Command, MovementAxes, Vec2};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraInput {
    /// Indicates whether the follow toggle was pressed this frame.
    pub toggle_follow: bool,
    /// Indicates whether the hold-to-center input is held.
    pub hold_center: bool,
    /// Screen-space pointer position, if the pointer is over the viewport.
    pub pointer: Option<Vec2>,
    /// Current viewport dimensions in screen units.
    pub viewport: Vec2,
}

/// Camera control system.
#[derive(Clone, Copy, Debug)]
pub struct CameraControl {
    follow: bool,
    edge_threshold: f32,
}

impl Default for CameraControl {
    fn default() -> Self {
        Self::new(EDGE_SCROLL_THRESHOLD)
    }
}

impl CameraControl {
    /// Creates a camera control system with follow disabled.
    #[must_use]
    pub const fn new(edge_threshold: f32) -> Self {
        Self {
            follow: false,
            edge_threshold,
        }
    }

    /// Reports whether the camera currently follows the player.
    #[must_use]
    pub const fn following(&self) -> bool {
        self.follow
    }

    /// Emits the camera command for this frame, if any.
    ///
    /// Following or holding the centre input recentres the camera on the
    /// player and suppresses edge scrolling for the frame.
    pub fn handle(&mut self, input: CameraInput, out: &mut Vec<Command>) {
        if input.toggle_follow {
            self.follow = !self.follow;
        }

        if self.follow || input.hold_center {
            out.push(Command::CenterCamera);
            return;
        }

        let edges = edge_flags(input.pointer, input.viewport, self.edge_threshold);
        if edges.any() {
            out.push(Command::ScrollCamera { edges });
        }
    }
}

/// Resolves which screen edges the pointer is resting against.
///
/// An edge is active when the pointer lies within `threshold` units of it,
/// inclusive.
#[must_use]
pub fn edge_flags(pointer: Option<Vec2>, viewport: Vec2, threshold: f32) -> MovementAxes {
    let Some(pointer) = pointer else {
        return MovementAxes::NONE;
    };
    MovementAxes {
        up: pointer.y <= threshold,
        down: pointer.y >= viewport.y - threshold,
        left: pointer.x <= threshold,
        right: pointer.x >= viewport.x - threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    #[test]
    fn corners_activate_two_edges() {
        let edges = edge_flags(Some(Vec2::new(1270.0, 5.0)), VIEWPORT, 20.0);
        assert_eq!(
            edges,
            MovementAxes {
                up: true,
                right: true,
                ..MovementAxes::NONE
            }
        );
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(edge_flags(Some(Vec2::new(20.0, 360.0)), VIEWPORT, 20.0).left);
        assert!(!edge_flags(Some(Vec2::new(20.5, 360.0)), VIEWPORT, 20.0).left);
        assert!(edge_flags(Some(Vec2::new(640.0, 700.0)), VIEWPORT, 20.0).down);
    }

    #[test]
    fn missing_pointer_never_scrolls() {
        assert_eq!(edge_flags(None, VIEWPORT, 20.0), MovementAxes::NONE);
    }
}
