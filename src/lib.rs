//! In-memory spatial indexes for geo-located objects.
//!
//! - [`QuadTree`]: grows as objects are added, answers range queries with a
//!   result cap and a total-hit estimate.
//! - [`SpatialHash`]: built once from a fixed set, answers exact range
//!   queries and nearest-object queries.
//!
//! ```rust
//! use geoindex::{BoundingCircle, Limit, QuadTree, SpatialHash, lat_lon};
//!
//! let cities = vec![
//!     (lat_lon(40.7128, -74.0060), "new york"),
//!     (lat_lon(34.0522, -118.2437), "los angeles"),
//!     (lat_lon(41.8781, -87.6298), "chicago"),
//! ];
//!
//! let mut tree = QuadTree::new(16);
//! for (i, city) in cities.iter().enumerate() {
//!     tree.put(*city, format!("{:03}", i), city.1)?;
//! }
//! let around_nyc = BoundingCircle::new(lat_lon(40.7, -74.0), 50_000.0);
//! let result = tree.get_in_area(&Limit(10), Some(&around_nyc));
//! assert_eq!(result.items()[0].1, "new york");
//!
//! let hash = SpatialHash::new(cities)?;
//! let nearest = hash.nearest(&lat_lon(42.3601, -71.0589)).unwrap();
//! assert_eq!(nearest.1, "new york");
//! # Ok::<(), geoindex::GeoIndexError>(())
//! ```

pub mod config;
pub mod error;
pub mod quadtree;
pub mod search;
pub mod spatial_hash;
pub mod validation;

#[cfg(feature = "sync")]
pub mod sync;

pub use config::IndexConfig;
pub use error::{GeoIndexError, Result};
pub use quadtree::{LevelStats, QuadTree, QuadTreeStats};
pub use search::{Limit, OwnedSearchResult, PredicateFilter, SearchFilter, SearchResult, filter_fn};
pub use spatial_hash::SpatialHash;

#[cfg(feature = "sync")]
pub use sync::SyncQuadTree;

pub use geo::{Point, Polygon, Rect};

pub use geoindex_types::{
    BoundingBox, BoundingCircle, BoundingShape, DynShape, HullShape, IntersectionShape, Located,
    UnionShape, distance_meters, lat_lon,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{GeoIndexError, IndexConfig, QuadTree, Result, SpatialHash};

    pub use crate::{Limit, SearchFilter, SearchResult, filter_fn};

    pub use geo::{Point, Polygon, Rect};

    pub use geoindex_types::{
        BoundingBox, BoundingCircle, BoundingShape, HullShape, IntersectionShape, Located,
        UnionShape, distance_meters, lat_lon,
    };

    #[cfg(feature = "sync")]
    pub use crate::SyncQuadTree;
}
