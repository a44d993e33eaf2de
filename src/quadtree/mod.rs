//! Quad tree over the (longitude, latitude) plane.
//!
//! The root covers `[-180, -90]..[180, 90]` and is split lazily along the
//! path of each insertion, so only populated regions of the world are
//! subdivided. Objects sit in leaves at a fixed `max_level`.
//!
//! # Search strategy
//!
//! A range query first walks the tree. The walk is abandoned as soon as it
//! has collected more than `floor(sqrt(len * max_results))` matches: at
//! that point the query is broad enough that scanning objects in rank order
//! and stopping at `max_results` is cheaper than completing the walk. The
//! fallback returns the best-ranked matches and estimates the total hit
//! count from a fixed-size sample.
//!
//! # Examples
//!
//! ```rust
//! use geoindex::{BoundingBox, Limit, QuadTree, lat_lon};
//!
//! let mut tree = QuadTree::new(12);
//! tree.put(lat_lon(45.07, 7.68), "001", "turin")?;
//! tree.put(lat_lon(45.46, 9.19), "002", "milan")?;
//! tree.put(lat_lon(41.90, 12.50), "003", "rome")?;
//!
//! let north = BoundingBox::new(lat_lon(44.0, 6.0), lat_lon(46.0, 10.0));
//! let result = tree.get_in_area(&Limit(10), Some(&north));
//! assert_eq!(result.len(), 2);
//! assert_eq!(result.estimated_total_hits(), 2);
//! # Ok::<(), geoindex::GeoIndexError>(())
//! ```

mod node;
mod stats;

#[cfg(test)]
mod tests;

pub use node::{Node, Quadrant};
pub use stats::{LevelStats, QuadTreeStats, edge_length_km};

use crate::config::{IndexConfig, MAX_TREE_LEVEL};
use crate::error::{GeoIndexError, Result};
use crate::search::{SearchFilter, SearchResult};
use crate::validation::validate_location;
use geo::{Coord, Rect};
use geoindex_types::{BoundingShape, Located};
use node::{clamp, clip};
use std::collections::BTreeMap;
use std::ops::ControlFlow;

/// Marker carried by [`ControlFlow::Break`] when a tree search collects
/// more matches than its cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapExceeded;

/// Spatial index of objects keyed by `(rank, uid)`.
///
/// Ranks order the fallback scan; within a rank, uids break ties. A key can
/// be stored only once. Objects are never removed.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    root: Node,
    max_level: u32,
    estimate_sample_size: usize,
    entries: Vec<T>,
    by_rank: BTreeMap<(String, String), usize>,
    node_count: usize,
}

impl<T: Located> QuadTree<T> {
    /// Empty tree with leaves at `max_level` (capped at
    /// [`MAX_TREE_LEVEL`]) and the default estimate sample size.
    pub fn new(max_level: u32) -> Self {
        Self::build(
            max_level.min(MAX_TREE_LEVEL),
            IndexConfig::default().estimate_sample_size,
        )
    }

    /// Empty tree tuned by `config`.
    pub fn with_config(config: &IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config.max_level, config.estimate_sample_size))
    }

    fn build(max_level: u32, estimate_sample_size: usize) -> Self {
        Self {
            root: Node::new(Rect::new((-180.0, -90.0), (180.0, 90.0)), 0),
            max_level,
            estimate_sample_size,
            entries: Vec::new(),
            by_rank: BTreeMap::new(),
            node_count: 1,
        }
    }

    /// Store `object` under `(rank, uid)`.
    ///
    /// Fails on a non-finite location or a key that is already present; the
    /// tree is unchanged in both cases.
    pub fn put(
        &mut self,
        object: T,
        rank: impl Into<String>,
        uid: impl Into<String>,
    ) -> Result<()> {
        let location = object.location();
        validate_location(&location)?;

        let key = (rank.into(), uid.into());
        if self.by_rank.contains_key(&key) {
            let (rank, uid) = key;
            return Err(GeoIndexError::DuplicateKey { rank, uid });
        }

        let slot = self.entries.len();
        let leaf = self.root.leaf_for(
            location.x(),
            location.y(),
            self.max_level,
            &mut self.node_count,
        );
        leaf.slots.push(slot);
        self.entries.push(object);
        self.by_rank.insert(key, slot);
        Ok(())
    }

    /// Objects inside `shape` accepted by `filter`.
    ///
    /// Without a shape, or when the area holds too many matches for the
    /// tree walk to pay off, this is [`linear_search`](Self::linear_search).
    /// Otherwise every match is returned, possibly more than
    /// `filter.max_results()`, with an exact hit count.
    pub fn get_in_area<F, S>(&self, filter: &F, shape: Option<&S>) -> SearchResult<'_, T>
    where
        F: SearchFilter<T> + ?Sized,
        S: BoundingShape + ?Sized,
    {
        let Some(shape) = shape else {
            return self.linear_search(filter, shape);
        };

        let cap = self.search_cap(filter.max_results());
        let mut collector = Collector {
            entries: &self.entries,
            world: self.root.bounds(),
            filter,
            shape,
            cap,
            hits: Vec::new(),
        };

        if self.tree_search(&mut collector).is_break() {
            log::debug!(
                "Tree search exceeded cap {} ({} objects), falling back to linear search",
                cap,
                self.len()
            );
            return self.linear_search(filter, Some(shape));
        }

        let total = collector.hits.len();
        log::trace!("Tree search matched {} objects", total);
        SearchResult::new(collector.hits, total)
    }

    fn tree_search<F, S>(&self, collector: &mut Collector<'_, '_, T, F, S>) -> ControlFlow<CapExceeded>
    where
        F: SearchFilter<T> + ?Sized,
        S: BoundingShape + ?Sized,
    {
        let ll = collector.shape.lower_left();
        let ur = collector.shape.upper_right();
        let world = self.root.bounds();

        if collector.shape.wraps_antimeridian() {
            collector.visit(
                &self.root,
                clamp(Coord { x: ll.x(), y: ll.y() }, &world),
                clamp(Coord { x: 180.0, y: ur.y() }, &world),
            )?;
            return collector.visit(
                &self.root,
                clamp(Coord { x: -180.0, y: ll.y() }, &world),
                clamp(Coord { x: ur.x(), y: ur.y() }, &world),
            );
        }

        collector.visit(&self.root, clamp(ll.into(), &world), clamp(ur.into(), &world))
    }

    /// Matches in `(rank, uid)` order, stopping at `filter.max_results()`.
    ///
    /// `estimated_total_hits` extrapolates the match rate of the first
    /// `estimate_sample_size` objects to the whole tree.
    pub fn linear_search<F, S>(&self, filter: &F, shape: Option<&S>) -> SearchResult<'_, T>
    where
        F: SearchFilter<T> + ?Sized,
        S: BoundingShape + ?Sized,
    {
        let accepts = |object: &T| {
            shape.is_none_or(|shape| shape.contains(&object.location())) && filter.matches(object)
        };

        let items: Vec<&T> = self
            .iter()
            .filter(|object| accepts(object))
            .take(filter.max_results())
            .collect();

        let tested = self.estimate_sample_size.min(self.len());
        let matched = self.iter().take(tested).filter(|object| accepts(object)).count();
        let estimate = if tested == 0 {
            0
        } else {
            (matched as f64 / tested as f64 * self.len() as f64) as usize
        };

        SearchResult::new(items, estimate)
    }

    fn search_cap(&self, max_results: usize) -> usize {
        (self.len() as f64 * max_results as f64).sqrt().floor() as usize
    }
}

impl<T> QuadTree<T> {
    /// All objects in `(rank, uid)` order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.by_rank
            .values()
            .filter_map(|&slot| self.entries.get(slot))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Nodes created so far, the root included.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn stats(&self) -> QuadTreeStats {
        QuadTreeStats::collect(&self.root, self.max_level, self.len())
    }

    /// Statistics for one level, `None` past `max_level`.
    pub fn level_stats(&self, level: u32) -> Option<LevelStats> {
        (level <= self.max_level).then(|| LevelStats::collect(&self.root, level))
    }
}

impl<T: Located> Default for QuadTree<T> {
    fn default() -> Self {
        Self::build(
            IndexConfig::default().max_level,
            IndexConfig::default().estimate_sample_size,
        )
    }
}

/// State threaded through one tree walk. Hits borrow from the tree (`'a`),
/// not from the query (`'q`).
struct Collector<'a, 'q, T, F: ?Sized, S: ?Sized> {
    entries: &'a [T],
    world: Rect<f64>,
    filter: &'q F,
    shape: &'q S,
    cap: usize,
    hits: Vec<&'a T>,
}

impl<'a, T, F, S> Collector<'a, '_, T, F, S>
where
    T: Located,
    F: SearchFilter<T> + ?Sized,
    S: BoundingShape + ?Sized,
{
    /// Search `node` for the query window `min..max`, already clipped to the
    /// node's bounds.
    fn visit(&mut self, node: &Node, min: Coord<f64>, max: Coord<f64>) -> ControlFlow<CapExceeded> {
        if min.x > max.x || min.y > max.y {
            return ControlFlow::Continue(());
        }

        let Some(children) = node.children() else {
            return self.scan(node, min, max);
        };

        let mid = node.bounds().center();
        let low = Quadrant::of(min.x, min.y, mid);
        let high = Quadrant::of(max.x, max.y, mid);

        if low == high {
            return self.visit(&children[low.index()], min, max);
        }

        if low == Quadrant::LowerLeft && high == Quadrant::UpperRight {
            for quadrant in [
                Quadrant::LowerLeft,
                Quadrant::UpperLeft,
                Quadrant::LowerRight,
                Quadrant::UpperRight,
            ] {
                self.visit_clipped(&children[quadrant.index()], min, max)?;
            }
            return ControlFlow::Continue(());
        }

        self.visit_clipped(&children[low.index()], min, max)?;
        self.visit_clipped(&children[high.index()], min, max)
    }

    fn visit_clipped(&mut self, child: &Node, min: Coord<f64>, max: Coord<f64>) -> ControlFlow<CapExceeded> {
        let (min, max) = clip(min, max, &child.bounds());
        self.visit(child, min, max)
    }

    /// Keep the leaf's objects that fall inside the window, the shape and the
    /// filter. The window check keeps the two halves of an antimeridian
    /// query from reporting an object twice. Locations outside the world are
    /// clamped onto its edge, where insertion placed them.
    fn scan(&mut self, leaf: &Node, min: Coord<f64>, max: Coord<f64>) -> ControlFlow<CapExceeded> {
        let entries = self.entries;
        for object in leaf.slots.iter().filter_map(|&slot| entries.get(slot)) {
            let location = object.location();
            let Coord { x, y } = clamp(location.into(), &self.world);
            if x < min.x || x > max.x || y < min.y || y > max.y {
                continue;
            }

            if self.shape.contains(&location) && self.filter.matches(object) {
                self.hits.push(object);
                if self.hits.len() > self.cap {
                    return ControlFlow::Break(CapExceeded);
                }
            }
        }
        ControlFlow::Continue(())
    }
}
