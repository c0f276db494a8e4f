//! World-space geometry shared by the world, the spatial index and adapters.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle expressed in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and dimensions.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle anchored at `origin` spanning `size`.
    #[must_use]
    pub const fn from_origin_and_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    /// Left edge of the rectangle.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Top edge of the rectangle.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Horizontal extent of the rectangle.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of the rectangle.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Right edge of the rectangle.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge of the rectangle.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left corner of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Dimensions of the rectangle.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Geometric centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Reports whether the two rectangles share interior area.
    ///
    /// Rectangles that merely touch along an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() <= other.x
            || self.x >= other.right()
            || self.bottom() <= other.y
            || self.y >= other.bottom())
    }

    /// Reports whether `point` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Reports whether `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Grows the rectangle by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }
}

/// Location of a fog-of-war chunk expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    column: u32,
    row: u32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Resolves the chunk containing `point`.
    ///
    /// Returns `None` for points left of or above the world origin, for
    /// non-finite coordinates and for a non-positive chunk size.
    #[must_use]
    pub fn containing(point: Vec2, chunk_size: f32) -> Option<Self> {
        if !point.is_finite() || chunk_size <= 0.0 || point.x < 0.0 || point.y < 0.0 {
            return None;
        }

        let column = (point.x / chunk_size).floor();
        let row = (point.y / chunk_size).floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }

        Some(Self::new(column as u32, row as u32))
    }

    /// Zero-based column index of the chunk.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the chunk.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Chebyshev distance between two chunk coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: ChunkCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }
}

/// Chebyshev distance between two world-space points.
#[must_use]
pub fn chebyshev_distance(a: Vec2, b: Vec2) -> f32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Four-way direction flags shared by player movement and camera scrolling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementAxes {
    /// Movement toward decreasing `y`.
    pub up: bool,
    /// Movement toward increasing `y`.
    pub down: bool,
    /// Movement toward decreasing `x`.
    pub left: bool,
    /// Movement toward increasing `x`.
    pub right: bool,
}

impl MovementAxes {
    /// Flags with no direction held.
    pub const NONE: Self = Self {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    /// Reports whether any direction flag is held.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Sums the held flags into a per-axis step of `speed` units.
    ///
    /// Opposing flags cancel and diagonals are not normalised, so holding two
    /// perpendicular flags moves `speed` units along each axis.
    #[must_use]
    pub fn step(&self, speed: f32) -> Vec2 {
        let mut delta = Vec2::ZERO;
        if self.up {
            delta.y -= speed;
        }
        if self.down {
            delta.y += speed;
        }
        if self.left {
            delta.x -= speed;
        }
        if self.right {
            delta.x += speed;
        }
        delta
    }
}
