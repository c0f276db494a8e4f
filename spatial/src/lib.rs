#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Broad-phase spatial index over axis-aligned rectangles.
//!
//! The [`Quadtree`] stores rectangles tagged with a copyable payload and
//! answers "which items could overlap this region" queries. Results from
//! [`Quadtree::retrieve`] are candidates only; callers that need exact answers
//! use [`Quadtree::query`], which applies the overlap test on top.

use outpost_core::{
    config::{QUADTREE_MAX_LEVELS, QUADTREE_MAX_OBJECTS},
    Rect,
};

/// Rectangle stored in the tree together with its payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadItem<T> {
    /// Bounds of the indexed object.
    pub bounds: Rect,
    /// Payload identifying the object.
    pub value: T,
}

impl<T> QuadItem<T> {
    /// Creates a new item.
    #[must_use]
    pub const fn new(bounds: Rect, value: T) -> Self {
        Self { bounds, value }
    }
}

/// Recursive quadtree with lazy splitting.
#[derive(Clone, Debug)]
pub struct Quadtree<T> {
    root: Node<T>,
    max_objects: usize,
    max_levels: u32,
    len: usize,
}

impl<T: Copy> Quadtree<T> {
    /// Creates an empty tree covering `bounds` with the default tuning.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self::with_limits(bounds, QUADTREE_MAX_OBJECTS, QUADTREE_MAX_LEVELS)
    }

    /// Creates an empty tree with explicit node capacity and depth cap.
    #[must_use]
    pub fn with_limits(bounds: Rect, max_objects: usize, max_levels: u32) -> Self {
        Self {
            root: Node::new(bounds, 0),
            max_objects,
            max_levels,
            len: 0,
        }
    }

    /// Region covered by the root node.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.root.bounds
    }

    /// Number of items stored in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Reports whether the tree holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Deepest level currently allocated, with the root at level zero.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.root.depth()
    }

    /// Removes every item and collapses the tree back to a single node.
    pub fn clear(&mut self) {
        self.root.items.clear();
        self.root.children = None;
        self.len = 0;
    }

    /// Inserts a rectangle.
    ///
    /// Items descend into the single child quadrant that fully contains them;
    /// items straddling a midline stay in the current node.
    pub fn insert(&mut self, bounds: Rect, value: T) {
        self.root.insert(
            QuadItem::new(bounds, value),
            self.max_objects,
            self.max_levels,
        );
        self.len += 1;
    }

    /// Collects every item whose node could overlap `region`.
    #[must_use]
    pub fn retrieve(&self, region: &Rect) -> Vec<QuadItem<T>> {
        let mut out = Vec::new();
        self.retrieve_into(region, &mut out);
        out
    }

    /// Appends the broad-phase candidates for `region` to `out`.
    pub fn retrieve_into(&self, region: &Rect, out: &mut Vec<QuadItem<T>>) {
        self.root.retrieve_into(region, out);
    }

    /// Collects the items whose bounds actually overlap `region`.
    #[must_use]
    pub fn query(&self, region: &Rect) -> Vec<QuadItem<T>> {
        let mut out = self.retrieve(region);
        out.retain(|item| item.bounds.overlaps(region));
        out
    }
}

#[derive(Clone, Debug)]
struct Node<T> {
    bounds: Rect,
    level: u32,
    items: Vec<QuadItem<T>>,
    children: Option<Box<[Node<T>; 4]>>,
}

impl<T: Copy> Node<T> {
    fn new(bounds: Rect, level: u32) -> Self {
        Self {
            bounds,
            level,
            items: Vec::new(),
            children: None,
        }
    }

    fn depth(&self) -> u32 {
        match &self.children {
            Some(children) => children.iter().map(Node::depth).max().unwrap_or(self.level),
            None => self.level,
        }
    }

    fn insert(&mut self, item: QuadItem<T>, max_objects: usize, max_levels: u32) {
        if let Some(children) = self.children.as_mut() {
            if let Some(index) = quadrant(&self.bounds, &item.bounds) {
                children[index].insert(item, max_objects, max_levels);
                return;
            }
        }

        self.items.push(item);

        if self.items.len() <= max_objects || self.level >= max_levels {
            return;
        }

        if self.children.is_none() {
            self.split();
        }

        let Self {
            bounds,
            items,
            children,
            ..
        } = self;
        let Some(children) = children.as_mut() else {
            return;
        };

        let mut index = 0;
        while index < items.len() {
            match quadrant(bounds, &items[index].bounds) {
                Some(target) => {
                    let moved = items.remove(index);
                    children[target].insert(moved, max_objects, max_levels);
                }
                None => index += 1,
            }
        }
    }

    fn split(&mut self) {
        let half_width = self.bounds.width() / 2.0;
        let half_height = self.bounds.height() / 2.0;
        let x = self.bounds.x();
        let y = self.bounds.y();
        let level = self.level + 1;

        self.children = Some(Box::new([
            Node::new(Rect::new(x + half_width, y, half_width, half_height), level),
            Node::new(Rect::new(x, y, half_width, half_height), level),
            Node::new(
                Rect::new(x, y + half_height, half_width, half_height),
                level,
            ),
            Node::new(
                Rect::new(x + half_width, y + half_height, half_width, half_height),
                level,
            ),
        ]));
    }

    fn retrieve_into(&self, region: &Rect, out: &mut Vec<QuadItem<T>>) {
        if let Some(children) = &self.children {
            match quadrant(&self.bounds, region) {
                Some(index) => children[index].retrieve_into(region, out),
                None => {
                    for child in children.iter() {
                        child.retrieve_into(region, out);
                    }
                }
            }
        }

        out.extend_from_slice(&self.items);
    }
}

/// Resolves the child quadrant that strictly contains `rect`.
///
/// Quadrants are numbered top-right, top-left, bottom-left, bottom-right.
fn quadrant(bounds: &Rect, rect: &Rect) -> Option<usize> {
    let vertical_midpoint = bounds.x() + bounds.width() / 2.0;
    let horizontal_midpoint = bounds.y() + bounds.height() / 2.0;

    let top = rect.y() < horizontal_midpoint && rect.bottom() < horizontal_midpoint;
    let bottom = rect.y() > horizontal_midpoint;

    if rect.x() < vertical_midpoint && rect.right() < vertical_midpoint {
        if top {
            Some(1)
        } else if bottom {
            Some(2)
        } else {
            None
        }
    } else if rect.x() > vertical_midpoint {
        if top {
            Some(0)
        } else if bottom {
            Some(3)
        } else {
            None
        }
    } else {
        None
    }
}
