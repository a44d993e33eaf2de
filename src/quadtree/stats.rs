use super::node::Node;
use serde::Serialize;

/// Approximate length of the equator, used to label tree levels.
const EQUATOR_KM: f64 = 40_000.0;

/// Approximate east-west edge length of a node at `level`, in kilometers.
pub fn edge_length_km(level: u32) -> f64 {
    EQUATOR_KM / 2f64.powi(level as i32)
}

/// Occupancy of one tree level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelStats {
    pub level: u32,
    pub edge_length_km: f64,
    /// Nodes that exist at this level.
    pub node_count: usize,
    /// Nodes at this level with at least one object below them.
    pub populated_nodes: usize,
    /// Largest number of objects below a single node at this level.
    pub max_objects: usize,
}

impl LevelStats {
    fn empty(level: u32) -> Self {
        Self {
            level,
            edge_length_km: edge_length_km(level),
            node_count: 0,
            populated_nodes: 0,
            max_objects: 0,
        }
    }
}

/// Snapshot of a tree's shape, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadTreeStats {
    pub object_count: usize,
    pub node_count: usize,
    pub max_level: u32,
    pub levels: Vec<LevelStats>,
}

impl QuadTreeStats {
    pub(crate) fn collect(root: &Node, max_level: u32, object_count: usize) -> Self {
        let mut levels: Vec<LevelStats> = (0..=max_level).map(LevelStats::empty).collect();
        walk(root, &mut levels);

        Self {
            object_count,
            node_count: levels.iter().map(|level| level.node_count).sum(),
            max_level,
            levels,
        }
    }

    /// Statistics for one level, `None` past the maximum level.
    pub fn level(&self, level: u32) -> Option<&LevelStats> {
        self.levels.get(level as usize)
    }
}

impl LevelStats {
    /// Statistics for `level` alone. Nodes above it are only passed through,
    /// but counting the objects under each node still visits its subtree.
    pub(crate) fn collect(root: &Node, level: u32) -> Self {
        let mut stats = Self::empty(level);
        visit_level(root, &mut stats);
        stats
    }
}

fn visit_level(node: &Node, stats: &mut LevelStats) {
    if node.level() < stats.level {
        for child in node.children().into_iter().flatten() {
            visit_level(child, stats);
        }
        return;
    }

    let below = objects_below(node);
    stats.node_count += 1;
    if below > 0 {
        stats.populated_nodes += 1;
    }
    stats.max_objects = stats.max_objects.max(below);
}

fn objects_below(node: &Node) -> usize {
    node.object_count()
        + node
            .children()
            .map_or(0, |children| children.iter().map(objects_below).sum::<usize>())
}

/// Accumulates `node` and its subtree into `levels`, returning the number of
/// objects below `node`.
fn walk(node: &Node, levels: &mut [LevelStats]) -> usize {
    let below = node.object_count()
        + node
            .children()
            .map_or(0, |children| children.iter().map(|child| walk(child, levels)).sum::<usize>());

    if let Some(stats) = levels.get_mut(node.level() as usize) {
        stats.node_count += 1;
        if below > 0 {
            stats.populated_nodes += 1;
        }
        stats.max_objects = stats.max_objects.max(below);
    }

    below
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_length_halves_per_level() {
        assert_eq!(edge_length_km(0), 40_000.0);
        assert_eq!(edge_length_km(1), 20_000.0);
        assert_eq!(edge_length_km(4), 2_500.0);
    }

    #[test]
    fn test_single_level_matches_full_walk() {
        let mut root = Node::new(geo::Rect::new((-180.0, -90.0), (180.0, 90.0)), 0);
        let mut created = 1;
        for (x, y) in [(10.0, 10.0), (10.1, 10.1), (-40.0, -40.0), (120.0, -60.0)] {
            root.leaf_for(x, y, 5, &mut created).slots.push(0);
        }

        let full = QuadTreeStats::collect(&root, 5, 4);
        for level in 0..=5 {
            assert_eq!(Some(&LevelStats::collect(&root, level)), full.level(level));
        }
        assert_eq!(LevelStats::collect(&root, 5).populated_nodes, 3);
    }
}
