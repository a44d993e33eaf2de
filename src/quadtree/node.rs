use geo::{Coord, Rect};

/// One of the four children of a split node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    LowerLeft = 0,
    LowerRight = 1,
    UpperLeft = 2,
    UpperRight = 3,
}

impl Quadrant {
    /// Quadrant of `(x, y)` relative to a split point. Points on the split
    /// lines belong to the right and top halves.
    #[inline]
    pub fn of(x: f64, y: f64, mid: Coord<f64>) -> Self {
        match (x >= mid.x, y >= mid.y) {
            (true, true) => Quadrant::UpperRight,
            (true, false) => Quadrant::LowerRight,
            (false, true) => Quadrant::UpperLeft,
            (false, false) => Quadrant::LowerLeft,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A rectangle of the (longitude, latitude) plane.
///
/// A node either has all four children or none. Only nodes at the tree's
/// maximum level hold objects, referenced by their slot in the tree's arena.
#[derive(Debug, Clone)]
pub struct Node {
    bounds: Rect<f64>,
    level: u32,
    pub(crate) slots: Vec<usize>,
    children: Option<Box<[Node; 4]>>,
}

impl Node {
    pub(crate) fn new(bounds: Rect<f64>, level: u32) -> Self {
        Self {
            bounds,
            level,
            slots: Vec::new(),
            children: None,
        }
    }

    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Children in [`Quadrant`] order, if this node has been split.
    pub fn children(&self) -> Option<&[Node; 4]> {
        self.children.as_deref()
    }

    /// Objects stored directly in this node (zero unless it is a leaf at the
    /// maximum level).
    pub fn object_count(&self) -> usize {
        self.slots.len()
    }

    /// Child holding `(x, y)`, or `None` for an unsplit node.
    pub fn child_for(&self, x: f64, y: f64) -> Option<&Node> {
        let children = self.children.as_deref()?;
        Some(&children[Quadrant::of(x, y, self.bounds.center()).index()])
    }

    /// Descend to the leaf at `max_level` that holds `(x, y)`, splitting
    /// every unsplit node on the way. `created` is bumped by four per split.
    pub(crate) fn leaf_for(
        &mut self,
        x: f64,
        y: f64,
        max_level: u32,
        created: &mut usize,
    ) -> &mut Node {
        let mut node = self;
        while node.level < max_level {
            let (bounds, level) = (node.bounds, node.level);
            if node.children.is_none() {
                *created += 4;
            }
            let children = node
                .children
                .get_or_insert_with(|| Box::new(quadrisect(bounds, level + 1)));
            node = &mut children[Quadrant::of(x, y, bounds.center()).index()];
        }
        node
    }
}

fn quadrisect(bounds: Rect<f64>, level: u32) -> [Node; 4] {
    let (min, max, mid) = (bounds.min(), bounds.max(), bounds.center());
    [
        Node::new(Rect::new(min, mid), level),
        Node::new(Rect::new((mid.x, min.y), (max.x, mid.y)), level),
        Node::new(Rect::new((min.x, mid.y), (mid.x, max.y)), level),
        Node::new(Rect::new(mid, max), level),
    ]
}

/// Moves `point` onto the nearest point of `bounds`.
pub(crate) fn clamp(point: Coord<f64>, bounds: &Rect<f64>) -> Coord<f64> {
    let (min, max) = (bounds.min(), bounds.max());
    Coord {
        x: point.x.clamp(min.x, max.x),
        y: point.y.clamp(min.y, max.y),
    }
}

/// Intersection of the query corners with `bounds`. May come out inverted
/// when the two do not overlap.
#[inline]
pub(crate) fn clip(min: Coord<f64>, max: Coord<f64>, bounds: &Rect<f64>) -> (Coord<f64>, Coord<f64>) {
    let (bmin, bmax) = (bounds.min(), bounds.max());
    (
        Coord {
            x: min.x.max(bmin.x),
            y: min.y.max(bmin.y),
        },
        Coord {
            x: max.x.min(bmax.x),
            y: max.y.min(bmax.y),
        },
    )
}
