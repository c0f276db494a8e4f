//! Chunked fog-of-war grid.

use outpost_core::{ChunkCoord, ChunkState, FogView, Rect, Vec2, VisionReach, VisionSource};

/// Fixed grid of fog chunks covering the world.
///
/// Each recompute clears the two per-pass visibility layers, stamps every
/// vision source onto them and then folds them into the persistent chunk
/// states. Exploration is sticky: once a chunk has been visible on either
/// layer it stays explored.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    columns: u32,
    rows: u32,
    chunk_size: f32,
    chunks: Vec<ChunkState>,
    world_mask: Vec<bool>,
    minimap_mask: Vec<bool>,
}

impl SpatialGrid {
    /// Creates a grid with every chunk unexplored and hidden.
    #[must_use]
    pub fn new(columns: u32, rows: u32, chunk_size: f32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            chunk_size,
            chunks: vec![ChunkState::default(); capacity],
            world_mask: vec![false; capacity],
            minimap_mask: vec![false; capacity],
        }
    }

    /// Provides the dimensions of the grid in chunks.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Recomputes both visibility layers and returns the number of chunks
    /// visible on the world map.
    ///
    /// Sources with [`VisionReach::ViewportGated`] only reveal world-map
    /// chunks inside the inclusive chunk range spanned by `viewport`.
    pub fn recompute_visibility(&mut self, sources: &[VisionSource], viewport: Rect) -> u32 {
        self.world_mask.fill(false);
        self.minimap_mask.fill(false);

        let viewport_range = self.viewport_range(viewport);
        for source in sources {
            self.stamp(source, viewport_range);
        }

        let mut visible_chunks = 0;
        for ((state, world), minimap) in self
            .chunks
            .iter_mut()
            .zip(&self.world_mask)
            .zip(&self.minimap_mask)
        {
            state.visible = *world;
            state.minimap_visible = *minimap;
            if *world || *minimap {
                state.explored = true;
            }
            if *world {
                visible_chunks += 1;
            }
        }
        visible_chunks
    }

    /// Returns the state of the provided chunk, if it lies inside the grid.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<ChunkState> {
        self.view().chunk(coord)
    }

    /// Returns the state of the chunk containing `point`.
    #[must_use]
    pub fn chunk_at(&self, point: Vec2) -> Option<ChunkState> {
        self.view().chunk_at(point)
    }

    /// Captures a read-only view of the grid.
    #[must_use]
    pub fn view(&self) -> FogView<'_> {
        FogView::new(&self.chunks, self.columns, self.rows, self.chunk_size)
    }

    fn stamp(&mut self, source: &VisionSource, viewport_range: Option<ChunkRange>) {
        let Some(center) = self.signed_chunk(source.center) else {
            return;
        };
        let radius = i64::from(source.radius);
        let Some(range) = ChunkRange::new(
            center.0 - radius,
            center.1 - radius,
            center.0 + radius,
            center.1 + radius,
        )
        .clip(self.columns, self.rows) else {
            return;
        };

        let width = self.columns as usize;
        for row in range.min_row..=range.max_row {
            for column in range.min_column..=range.max_column {
                let index = row as usize * width + column as usize;
                self.minimap_mask[index] = true;

                let revealed = match source.reach {
                    VisionReach::Always => true,
                    VisionReach::ViewportGated => {
                        viewport_range.is_some_and(|viewport| viewport.contains(column, row))
                    }
                };
                if revealed {
                    self.world_mask[index] = true;
                }
            }
        }
    }

    fn viewport_range(&self, viewport: Rect) -> Option<ChunkRange> {
        if self.chunk_size <= 0.0 {
            return None;
        }
        let first_column = (viewport.x() / self.chunk_size).floor() as i64;
        let first_row = (viewport.y() / self.chunk_size).floor() as i64;
        let last_column = (viewport.right() / self.chunk_size).ceil() as i64;
        let last_row = (viewport.bottom() / self.chunk_size).ceil() as i64;
        ChunkRange::new(first_column, first_row, last_column, last_row)
            .clip(self.columns, self.rows)
    }

    fn signed_chunk(&self, point: Vec2) -> Option<(i64, i64)> {
        if self.chunk_size <= 0.0 || !point.is_finite() {
            return None;
        }
        Some((
            (point.x / self.chunk_size).floor() as i64,
            (point.y / self.chunk_size).floor() as i64,
        ))
    }
}

/// Inclusive rectangular block of chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ChunkRange {
    min_column: i64,
    min_row: i64,
    max_column: i64,
    max_row: i64,
}

impl ChunkRange {
    const fn new(min_column: i64, min_row: i64, max_column: i64, max_row: i64) -> Self {
        Self {
            min_column,
            min_row,
            max_column,
            max_row,
        }
    }

    fn clip(self, columns: u32, rows: u32) -> Option<Self> {
        let clipped = Self::new(
            self.min_column.max(0),
            self.min_row.max(0),
            self.max_column.min(i64::from(columns) - 1),
            self.max_row.min(i64::from(rows) - 1),
        );
        (clipped.min_column <= clipped.max_column && clipped.min_row <= clipped.max_row)
            .then_some(clipped)
    }

    fn contains(&self, column: i64, row: i64) -> bool {
        (self.min_column..=self.max_column).contains(&column)
            && (self.min_row..=self.max_row).contains(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible(grid: &SpatialGrid, column: u32, row: u32) -> bool {
        grid.chunk(ChunkCoord::new(column, row))
            .is_some_and(|state| state.visible)
    }

    #[test]
    fn player_vision_covers_a_seven_chunk_square() {
        let mut grid = SpatialGrid::new(25, 25, 100.0);
        let sources = [VisionSource::player(Vec2::new(1250.0, 1250.0), 3)];
        let count = grid.recompute_visibility(&sources, Rect::new(0.0, 0.0, 0.0, 0.0));

        assert_eq!(count, 49);
        assert!(visible(&grid, 9, 9));
        assert!(visible(&grid, 15, 15));
        assert!(!visible(&grid, 8, 12));
        assert!(!visible(&grid, 12, 16));
    }

    #[test]
    fn vision_is_clipped_at_the_world_edge() {
        let mut grid = SpatialGrid::new(10, 10, 100.0);
        let sources = [VisionSource::player(Vec2::new(25.0, 25.0), 3)];

        assert_eq!(grid.recompute_visibility(&sources, Rect::default()), 16);
    }

    #[test]
    fn building_vision_outside_the_viewport_only_reaches_the_minimap() {
        let mut grid = SpatialGrid::new(20, 20, 100.0);
        let sources = [VisionSource::building(Vec2::new(1550.0, 1550.0), 2)];
        let count = grid.recompute_visibility(&sources, Rect::new(0.0, 0.0, 500.0, 500.0));
        let state = grid
            .chunk(ChunkCoord::new(15, 15))
            .expect("chunk inside grid");

        assert_eq!(count, 0);
        assert!(!state.visible);
        assert!(state.minimap_visible);
        assert!(state.explored);
    }

    #[test]
    fn viewport_range_is_inclusive_of_the_far_edge() {
        let mut grid = SpatialGrid::new(20, 20, 100.0);
        let sources = [VisionSource::building(Vec2::new(750.0, 250.0), 2)];
        let _ = grid.recompute_visibility(&sources, Rect::new(0.0, 0.0, 500.0, 500.0));

        assert!(visible(&grid, 5, 2));
        assert!(!visible(&grid, 6, 2));
    }

    #[test]
    fn explored_chunks_stay_explored_after_vision_moves_away() {
        let mut grid = SpatialGrid::new(20, 20, 100.0);
        let _ = grid.recompute_visibility(
            &[VisionSource::player(Vec2::new(150.0, 150.0), 1)],
            Rect::default(),
        );
        let _ = grid.recompute_visibility(
            &[VisionSource::player(Vec2::new(1850.0, 1850.0), 1)],
            Rect::default(),
        );

        let state = grid
            .chunk(ChunkCoord::new(1, 1))
            .expect("chunk inside grid");
        assert!(state.explored);
        assert!(!state.visible);
        assert!(!state.minimap_visible);
    }
}
