//! Static two-level hash index for range and nearest-object queries.
//!
//! Objects are sorted by latitude and cut into rows of roughly `sqrt(n)`
//! objects each. A [`HashFunction`] over the row minimum latitudes finds the
//! rows for a latitude, and each row's own [`HashFunction`] over its sorted
//! longitudes finds the columns. For evenly spread data both lookups are
//! O(1) on average.
//!
//! The index is built once and never changes.
//!
//! # Examples
//!
//! ```rust
//! use geoindex::{BoundingBox, SpatialHash, lat_lon};
//!
//! let hash = SpatialHash::new(vec![
//!     lat_lon(0.0, 0.0),
//!     lat_lon(0.0, 1.0),
//!     lat_lon(1.0, 0.0),
//!     lat_lon(1.0, 1.0),
//! ])?;
//!
//! assert_eq!(hash.nearest(&lat_lon(0.51, 0.51)), Some(&lat_lon(1.0, 1.0)));
//!
//! let west = BoundingBox::new(lat_lon(-1.0, -1.0), lat_lon(2.0, 0.5));
//! assert_eq!(hash.query_within(&west).len(), 2);
//! # Ok::<(), geoindex::GeoIndexError>(())
//! ```

mod hash_function;
mod row;


pub use hash_function::HashFunction;
pub use row::DataRow;

use crate::config::IndexConfig;
use crate::error::Result;
use crate::validation::validate_locations;
use geo::Point;
use geoindex_types::{BoundingBox, BoundingShape, Located, is_finite, meters_per_degree_latitude};
use row::{Best, beaten};

/// Immutable spatial index over a fixed set of objects.
#[derive(Debug, Clone)]
pub struct SpatialHash<T> {
    rows: Vec<DataRow<T>>,
    row_index: HashFunction,
    bounds: Option<BoundingBox>,
    len: usize,
}

impl<T: Located> SpatialHash<T> {
    /// Index `data` with the default configuration.
    pub fn new(data: impl IntoIterator<Item = T>) -> Result<Self> {
        Self::with_config(data, &IndexConfig::default())
    }

    /// Index `data`. Fails if `config` is invalid or an object has a
    /// non-finite location. An empty `data` gives an index that answers
    /// every query with nothing.
    pub fn with_config(data: impl IntoIterator<Item = T>, config: &IndexConfig) -> Result<Self> {
        config.validate()?;

        let mut objects: Vec<T> = data.into_iter().collect();
        let locations: Vec<Point> = objects.iter().map(Located::location).collect();
        validate_locations(&locations)?;

        let len = objects.len();
        let bounds = BoundingBox::from_points(locations);
        if len == 0 {
            return Ok(Self {
                rows: Vec::new(),
                row_index: HashFunction::new(Vec::new(), 0.0, 0.0, 1),
                bounds,
                len,
            });
        }

        let row_size = config.row_size.unwrap_or_else(|| default_row_size(len));
        objects.sort_by(|a, b| a.location().y().total_cmp(&b.location().y()));

        let mut rows = Vec::with_capacity(len.div_ceil(row_size));
        let mut remaining = objects.into_iter();
        loop {
            let chunk: Vec<T> = remaining.by_ref().take(row_size).collect();
            if chunk.is_empty() {
                break;
            }
            rows.push(DataRow::new(
                chunk,
                row_size.saturating_mul(config.column_lookup_factor),
            ));
        }

        let lat_mins: Vec<f64> = rows.iter().map(DataRow::lat_min).collect();
        let (lat_min, lat_max) = bounds.map_or((0.0, 0.0), |bounds| {
            (bounds.lower_left().y(), bounds.upper_right().y())
        });
        let row_index = HashFunction::new(
            lat_mins,
            lat_min,
            lat_max,
            row_size.saturating_mul(config.row_lookup_factor),
        );

        log::debug!(
            "Built spatial hash: {} objects in {} rows of up to {}",
            len,
            rows.len(),
            row_size
        );

        Ok(Self {
            rows,
            row_index,
            bounds,
            len,
        })
    }

    /// Every object that `shape` contains, in row-major order.
    ///
    /// A shape whose lower-left longitude is greater than its upper-right
    /// longitude is searched on both sides of the antimeridian. Queries that
    /// cross a pole are not supported.
    pub fn query_within<S: BoundingShape + ?Sized>(&self, shape: &S) -> Vec<&T> {
        let mut out = Vec::new();
        if self.rows.is_empty() {
            return out;
        }

        let ll = shape.lower_left();
        let ur = shape.upper_right();

        let first = self.row_index.lookup(ll.y()).saturating_sub(1);
        let mut last = self.row_index.lookup(ur.y());
        while self
            .rows
            .get(last + 1)
            .is_some_and(|row| row.lat_min() <= ur.y())
        {
            last += 1;
        }

        let wraps = shape.wraps_antimeridian();
        for row in self.rows.get(first..=last).unwrap_or(&[]) {
            if row.lat_max() < ll.y() || row.lat_min() > ur.y() {
                continue;
            }

            if wraps {
                row.collect_within(shape, ll.x(), f64::INFINITY, &mut out);
                row.collect_within(shape, f64::NEG_INFINITY, ur.x(), &mut out);
            } else {
                row.collect_within(shape, ll.x(), ur.x(), &mut out);
            }
        }

        log::trace!("Spatial hash range query matched {} objects", out.len());
        out
    }

    /// The object closest to `point` by great-circle distance.
    ///
    /// `None` for an empty index or a non-finite point. Ties between equally
    /// distant objects are broken arbitrarily.
    pub fn nearest(&self, point: &Point<f64>) -> Option<&T> {
        if self.rows.is_empty() {
            return None;
        }
        if !is_finite(point) {
            log::warn!("Ignoring nearest query at non-finite point {:?}", point);
            return None;
        }

        let lat = point.y();
        let meters_per_degree = meters_per_degree_latitude(point);
        let cos_at = lat.to_radians().cos().max(0.0);

        // Last row starting at or below the query latitude, if any.
        let mut start = self.row_index.lookup(lat);
        if start > 0 && self.rows.get(start).is_some_and(|row| row.lat_min() > lat) {
            start -= 1;
        }

        let mut best: Best<'_, T> = None;
        if let Some(row) = self.rows.get(start) {
            row.nearest(point, cos_at, &mut best);
        }

        for row in self.rows.iter().skip(start + 1) {
            let bound = (row.lat_min() - lat) * meters_per_degree;
            if beaten(&best, bound) {
                break;
            }
            row.nearest(point, cos_at, &mut best);
        }

        for row in self.rows.iter().take(start).rev() {
            let bound = (lat - row.lat_max()) * meters_per_degree;
            if beaten(&best, bound) {
                break;
            }
            row.nearest(point, cos_at, &mut best);
        }

        best.map(|(object, _)| object)
    }
}

impl<T> SpatialHash<T> {
    /// All objects, row by row, each row in longitude order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.rows.iter().flat_map(|row| row.objects().iter())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[DataRow<T>] {
        &self.rows
    }

    /// Smallest box holding every object, `None` when empty.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }
}

/// `ceil(sqrt(n - 1)) + 1` objects per row.
pub fn default_row_size(len: usize) -> usize {
    (len.saturating_sub(1) as f64).sqrt().ceil() as usize + 1
}
