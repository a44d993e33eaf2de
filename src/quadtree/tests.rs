//! Tests for the quad tree index.

use super::*;
use crate::search::{Limit, filter_fn};
use geo::{Point, Rect};
use geoindex_types::{BoundingBox, BoundingCircle, lat_lon};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type Tagged = (Point, usize);

fn rank(i: usize) -> String {
    format!("{:06}", i)
}

fn tree_of(max_level: u32, points: &[Point]) -> QuadTree<Tagged> {
    let mut tree = QuadTree::new(max_level);
    for (i, point) in points.iter().enumerate() {
        tree.put((*point, i), rank(i), format!("uid-{}", i)).unwrap();
    }
    tree
}

fn ids<'a>(items: impl IntoIterator<Item = &'a Tagged>) -> Vec<usize> {
    let mut ids: Vec<usize> = items.into_iter().map(|(_, id)| *id).collect();
    ids.sort_unstable();
    ids
}

fn brute_force<S: BoundingShape>(points: &[Point], shape: &S) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| shape.contains(point))
        .map(|(i, _)| i)
        .collect()
}

fn grid() -> Vec<Point> {
    let mut points = Vec::new();
    for lat in 0..10 {
        for lon in 0..10 {
            points.push(lat_lon(lat as f64, lon as f64));
        }
    }
    points
}

#[test]
fn test_put_counts_nodes_and_objects() {
    let mut tree = QuadTree::new(2);
    assert!(tree.is_empty());
    assert_eq!(tree.node_count(), 1);

    tree.put(lat_lon(45.0, 7.0), "a", "1").unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.node_count(), 9);

    // Same leaf, no new nodes.
    tree.put(lat_lon(45.1, 7.1), "a", "2").unwrap();
    assert_eq!(tree.node_count(), 9);

    // Other hemisphere splits a fresh level-1 node.
    tree.put(lat_lon(-45.0, -100.0), "b", "1").unwrap();
    assert_eq!(tree.node_count(), 13);
    assert_eq!(tree.max_level(), 2);
}

#[test]
fn test_duplicate_key_rejected() {
    let mut tree = QuadTree::new(4);
    tree.put(lat_lon(1.0, 1.0), "r", "u").unwrap();

    let err = tree.put(lat_lon(2.0, 2.0), "r", "u").unwrap_err();
    assert!(matches!(
        err,
        GeoIndexError::DuplicateKey { ref rank, ref uid } if rank == "r" && uid == "u"
    ));
    assert_eq!(tree.len(), 1);

    // Keys are compared as pairs, not concatenated.
    tree.put(lat_lon(2.0, 2.0), "ru", "").unwrap();
    tree.put(lat_lon(3.0, 3.0), "", "ru").unwrap();
    assert_eq!(tree.len(), 3);
}

#[test]
fn test_non_finite_rejected() {
    let mut tree = QuadTree::new(4);
    assert!(matches!(
        tree.put(lat_lon(f64::NAN, 0.0), "r", "u"),
        Err(GeoIndexError::InvalidInput(_))
    ));
    assert!(tree.put(lat_lon(0.0, f64::INFINITY), "r", "u").is_err());
    assert!(tree.is_empty());
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn test_with_config() {
    let config = IndexConfig::default()
        .with_max_level(5)
        .with_estimate_sample_size(7);
    let tree: QuadTree<Point> = QuadTree::with_config(&config).unwrap();
    assert_eq!(tree.max_level(), 5);

    let bad = IndexConfig::default().with_max_level(99);
    assert!(QuadTree::<Point>::with_config(&bad).is_err());

    assert_eq!(QuadTree::<Point>::new(99).max_level(), MAX_TREE_LEVEL);
}

#[test]
fn test_box_query_on_grid() {
    let points = grid();
    let tree = tree_of(8, &points);
    let query = BoundingBox::new(lat_lon(2.0, 3.0), lat_lon(4.0, 5.0));

    let result = tree.get_in_area(&Limit(100), Some(&query));
    assert_eq!(result.len(), 9);
    assert_eq!(result.estimated_total_hits(), 9);
    assert_eq!(ids(result.iter()), brute_force(&points, &query));
}

#[test]
fn test_query_on_split_lines() {
    // Points exactly on the root's midlines.
    let points = vec![
        lat_lon(0.0, 0.0),
        lat_lon(0.0, -10.0),
        lat_lon(-10.0, 0.0),
        lat_lon(10.0, 10.0),
    ];
    let tree = tree_of(6, &points);

    let around_origin = BoundingBox::new(lat_lon(-1.0, -1.0), lat_lon(1.0, 1.0));
    assert_eq!(ids(tree.get_in_area(&Limit(10), Some(&around_origin))), vec![0]);

    let on_origin = BoundingBox::new(lat_lon(0.0, 0.0), lat_lon(0.0, 0.0));
    assert_eq!(ids(tree.get_in_area(&Limit(10), Some(&on_origin))), vec![0]);

    let everything = BoundingBox::new(lat_lon(-90.0, -180.0), lat_lon(90.0, 180.0));
    assert_eq!(
        ids(tree.get_in_area(&Limit(10), Some(&everything))),
        vec![0, 1, 2, 3]
    );
}

#[test]
fn test_random_queries_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(7);
    let points: Vec<Point> = (0..500)
        .map(|_| lat_lon(rng.random_range(-60.0..60.0), rng.random_range(-170.0..170.0)))
        .collect();
    let tree = tree_of(10, &points);

    // cap = sqrt(500 * 1000) exceeds the number of objects, so the tree
    // result is always complete.
    for _ in 0..50 {
        let lat = rng.random_range(-60.0..50.0);
        let lon = rng.random_range(-170.0..140.0);
        let query = BoundingBox::new(
            lat_lon(lat, lon),
            lat_lon(lat + rng.random_range(0.5..20.0), lon + rng.random_range(0.5..40.0)),
        );
        let result = tree.get_in_area(&Limit(1000), Some(&query));
        let expected = brute_force(&points, &query);
        assert_eq!(result.estimated_total_hits(), expected.len());
        assert_eq!(ids(result), expected);
    }

    for _ in 0..20 {
        let center = lat_lon(rng.random_range(-50.0..50.0), rng.random_range(-150.0..150.0));
        let circle = BoundingCircle::new(center, rng.random_range(10_000.0..1_500_000.0));
        let result = tree.get_in_area(&Limit(1000), Some(&circle));
        assert_eq!(ids(result), brute_force(&points, &circle));
    }
}

#[test]
fn test_filter_applies_during_tree_search() {
    let points = grid();
    let tree = tree_of(8, &points);
    let query = BoundingBox::new(lat_lon(0.0, 0.0), lat_lon(9.0, 9.0));
    let even = filter_fn(1000, |(_, id): &Tagged| id % 2 == 0);

    let result = tree.get_in_area(&even, Some(&query));
    assert_eq!(result.len(), 50);
    assert!(result.iter().all(|(_, id)| id % 2 == 0));
}

#[test]
fn test_dense_area_falls_back_to_rank_order() {
    let mut rng = StdRng::seed_from_u64(11);
    let points: Vec<Point> = (0..1000)
        .map(|_| lat_lon(rng.random_range(10.0..11.0), rng.random_range(20.0..21.0)))
        .collect();
    let tree = tree_of(12, &points);
    let query = BoundingBox::new(lat_lon(9.0, 19.0), lat_lon(12.0, 22.0));

    // cap = floor(sqrt(1000 * 5)) = 70 < 1000 matches.
    let result = tree.get_in_area(&Limit(5), Some(&query));
    let got: Vec<usize> = result.iter().map(|(_, id)| *id).collect();
    assert_eq!(got, vec![0, 1, 2, 3, 4]);
    assert_eq!(result.estimated_total_hits(), 1000);
}

#[test]
fn test_fallback_estimate_uses_sample() {
    let points: Vec<Point> = (0..1000).map(|i| lat_lon(0.001 * i as f64, 5.0)).collect();
    let tree = tree_of(10, &points);
    let query = BoundingBox::new(lat_lon(-1.0, 4.0), lat_lon(2.0, 6.0));
    let odd = filter_fn(3, |(_, id): &Tagged| id % 2 == 1);

    let result = tree.get_in_area(&odd, Some(&query));
    let got: Vec<usize> = result.iter().map(|(_, id)| *id).collect();
    assert_eq!(got, vec![1, 3, 5]);
    // Half of the first 100 objects match.
    assert_eq!(result.estimated_total_hits(), 500);
}

#[test]
fn test_sample_size_from_config() {
    let config = IndexConfig::default().with_estimate_sample_size(10);
    let mut tree = QuadTree::with_config(&config).unwrap();
    for i in 0..100usize {
        let lat = if i < 5 { 1.0 } else { 50.0 };
        tree.put((lat_lon(lat, 1.0), i), rank(i), "").unwrap();
    }
    let query = BoundingBox::new(lat_lon(0.0, 0.0), lat_lon(2.0, 2.0));

    let result = tree.linear_search(&Limit(100), Some(&query));
    assert_eq!(result.len(), 5);
    // 5 of the first 10 match.
    assert_eq!(result.estimated_total_hits(), 50);
}

#[test]
fn test_no_shape_is_linear_search() {
    let points = grid();
    let tree = tree_of(4, &points);

    let result = tree.get_in_area(&Limit(3), None::<&BoundingBox>);
    let got: Vec<usize> = result.iter().map(|(_, id)| *id).collect();
    assert_eq!(got, vec![0, 1, 2]);
    assert_eq!(result.estimated_total_hits(), 100);
}

#[test]
fn test_rank_order_not_insertion_order() {
    let mut tree = QuadTree::new(4);
    tree.put((lat_lon(0.0, 0.0), 0), "c", "x").unwrap();
    tree.put((lat_lon(0.0, 0.0), 1), "a", "y").unwrap();
    tree.put((lat_lon(0.0, 0.0), 2), "b", "x").unwrap();
    tree.put((lat_lon(0.0, 0.0), 3), "a", "x").unwrap();

    let order: Vec<usize> = tree.iter().map(|(_, id)| *id).collect();
    assert_eq!(order, vec![3, 1, 2, 0]);

    let first_two: Vec<usize> = tree
        .linear_search(&Limit(2), None::<&BoundingBox>)
        .iter()
        .map(|(_, id)| *id)
        .collect();
    assert_eq!(first_two, vec![3, 1]);
}

#[test]
fn test_antimeridian_query_returns_both_sides_once() {
    let points = vec![
        lat_lon(0.0, 175.0),
        lat_lon(1.0, -175.0),
        lat_lon(-2.0, 179.9),
        lat_lon(2.0, -179.9),
        lat_lon(0.0, 0.0),
        lat_lon(0.0, 160.0),
        lat_lon(0.0, -160.0),
        lat_lon(30.0, 175.0),
    ];
    let query = BoundingBox::new(lat_lon(-10.0, 170.0), lat_lon(10.0, -170.0));

    for max_level in [0, 1, 8] {
        let tree = tree_of(max_level, &points);
        let result = tree.get_in_area(&Limit(100), Some(&query));
        assert_eq!(ids(result.iter()), vec![0, 1, 2, 3], "max_level {}", max_level);
        assert_eq!(result.estimated_total_hits(), 4);
    }
}

#[test]
fn test_antimeridian_fallback_agrees_with_tree() {
    let points: Vec<Point> = (0..400)
        .map(|i| {
            let lon = if i % 2 == 0 { 175.0 } else { -175.0 };
            lat_lon((i / 2) as f64 * 0.01, lon)
        })
        .collect();
    let tree = tree_of(10, &points);
    let query = BoundingBox::new(lat_lon(-1.0, 170.0), lat_lon(5.0, -170.0));

    let complete = tree.get_in_area(&Limit(400), Some(&query));
    assert_eq!(complete.len(), 400);

    // cap = sqrt(400 * 2) = 28, far below 400 matches.
    let truncated = tree.get_in_area(&Limit(2), Some(&query));
    let got: Vec<usize> = truncated.iter().map(|(_, id)| *id).collect();
    assert_eq!(got, vec![0, 1]);
}

#[test]
fn test_zero_max_results() {
    let tree = tree_of(6, &grid());
    let query = BoundingBox::new(lat_lon(0.0, 0.0), lat_lon(9.0, 9.0));

    let result = tree.get_in_area(&Limit(0), Some(&query));
    assert!(result.is_empty());
    assert_eq!(result.estimated_total_hits(), 100);
}

#[test]
fn test_empty_tree() {
    let tree: QuadTree<Point> = QuadTree::new(8);
    let query = BoundingBox::new(lat_lon(-10.0, -10.0), lat_lon(10.0, 10.0));

    let result = tree.get_in_area(&Limit(10), Some(&query));
    assert!(result.is_empty());
    assert_eq!(result.estimated_total_hits(), 0);

    let result = tree.linear_search(&Limit(10), None::<&BoundingBox>);
    assert!(result.is_empty());
    assert_eq!(result.estimated_total_hits(), 0);
}

#[test]
fn test_query_outside_world() {
    let tree = tree_of(6, &grid());
    let query = BoundingBox::new(lat_lon(95.0, 0.0), lat_lon(100.0, 10.0));
    assert!(tree.get_in_area(&Limit(10), Some(&query)).is_empty());
}

#[test]
fn test_stats() {
    let points = vec![lat_lon(10.0, 10.0), lat_lon(10.1, 10.1), lat_lon(-40.0, -40.0)];
    let tree = tree_of(3, &points);
    let stats = tree.stats();

    assert_eq!(stats.object_count, 3);
    assert_eq!(stats.max_level, 3);
    assert_eq!(stats.levels.len(), 4);
    assert_eq!(stats.node_count, tree.node_count());

    let root = stats.level(0).unwrap();
    assert_eq!(root.node_count, 1);
    assert_eq!(root.populated_nodes, 1);
    assert_eq!(root.max_objects, 3);
    assert_eq!(root.edge_length_km, 40_000.0);

    let leaves = tree.level_stats(3).unwrap();
    assert_eq!(leaves.populated_nodes, 2);
    assert_eq!(leaves.max_objects, 2);
    assert_eq!(leaves.node_count, 8);
    assert_eq!(leaves.edge_length_km, 5_000.0);

    assert!(tree.level_stats(4).is_none());
}

#[test]
fn test_out_of_range_objects_found_by_tree_walk() {
    let mut points: Vec<Point> = (0..50).map(|i| lat_lon(-40.0 + i as f64, -100.0 + i as f64)).collect();
    points.push(lat_lon(0.0, 200.0));
    points.push(lat_lon(95.0, -190.0));
    let tree = tree_of(10, &points);

    let east = Rect::new((190.0, -10.0), (210.0, 10.0));
    let wrapping = BoundingBox::new(lat_lon(-10.0, 170.0), lat_lon(10.0, -170.0));
    let north = BoundingBox::new(lat_lon(91.0, -200.0), lat_lon(99.0, -180.0));

    // Below the cap, so each query is answered by the tree walk.
    assert_eq!(ids(tree.get_in_area(&Limit(10), Some(&east)).iter()), vec![50]);
    assert_eq!(ids(tree.get_in_area(&Limit(10), Some(&wrapping)).iter()), vec![50]);
    assert_eq!(ids(tree.get_in_area(&Limit(10), Some(&north)).iter()), vec![51]);

    for result in [
        tree.linear_search(&Limit(10), Some(&east)),
        tree.linear_search(&Limit(10), Some(&wrapping)),
    ] {
        assert_eq!(ids(result.iter()), vec![50]);
    }
    assert_eq!(ids(tree.linear_search(&Limit(10), Some(&north)).iter()), vec![51]);
}

#[test]
fn test_level_stats_match_full_stats() {
    let points = vec![lat_lon(10.0, 10.0), lat_lon(10.1, 10.1), lat_lon(-40.0, -40.0)];
    let tree = tree_of(4, &points);
    let stats = tree.stats();
    for level in 0..=4 {
        assert_eq!(tree.level_stats(level).as_ref(), stats.level(level));
    }
}
