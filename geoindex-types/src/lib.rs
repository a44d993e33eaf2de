//! # geoindex-types
//!
//! Core geometry primitives for the geoindex spatial indexes.
//!
//! - **Coordinates**: `geo::Point<f64>` with `x` = longitude and `y` = latitude,
//!   plus haversine helpers in [`point`]
//! - **Located**: the only capability the indexes require of stored objects
//! - **Shapes**: [`BoundingBox`], [`BoundingCircle`], [`UnionShape`],
//!   [`IntersectionShape`] and [`HullShape`], all behind [`BoundingShape`]
//!
//! ## Examples
//!
//! ```rust
//! use geoindex_types::{BoundingCircle, BoundingShape, lat_lon};
//!
//! let berlin = lat_lon(52.5200, 13.4050);
//! let circle = BoundingCircle::new(berlin, 5_000.0);
//! assert!(circle.contains(&lat_lon(52.5300, 13.4100)));
//! assert!(!circle.contains(&lat_lon(48.1351, 11.5820)));
//! ```

pub mod point;
pub mod shape;

pub use point::{
    EARTH_RADIUS_METERS, Located, distance_meters, is_finite, lat_lon, meters_per_degree_latitude,
    moved_by_meters,
};
pub use shape::{
    BoundingBox, BoundingCircle, BoundingShape, DynShape, HullShape, IntersectionShape, UnionShape,
};
