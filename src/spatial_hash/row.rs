use super::hash_function::HashFunction;
use geo::Point;
use geoindex_types::{BoundingShape, EARTH_RADIUS_METERS, Located, distance_meters};

/// Best candidate seen so far and its distance in meters.
pub(crate) type Best<'a, T> = Option<(&'a T, f64)>;

/// A band of objects adjacent in latitude, sorted by longitude.
#[derive(Debug, Clone)]
pub struct DataRow<T> {
    objects: Vec<T>,
    columns: HashFunction,
    lat_min: f64,
    lat_max: f64,
}

impl<T: Located> DataRow<T> {
    /// Sort `objects` by longitude and index them with `table_size` buckets.
    pub(crate) fn new(mut objects: Vec<T>, table_size: usize) -> Self {
        objects.sort_by(|a, b| a.location().x().total_cmp(&b.location().x()));

        let (lat_min, lat_max) = objects
            .iter()
            .map(|object| object.location().y())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), lat| {
                (min.min(lat), max.max(lat))
            });

        let keys: Vec<f64> = objects.iter().map(|object| object.location().x()).collect();
        let (first, last) = match (keys.first(), keys.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => (0.0, 0.0),
        };

        Self {
            objects,
            columns: HashFunction::new(keys, first, last, table_size),
            lat_min,
            lat_max,
        }
    }

    /// Push every object with a longitude in `from..=to` that `shape`
    /// contains.
    pub(crate) fn collect_within<'a, S>(&'a self, shape: &S, from: f64, to: f64, out: &mut Vec<&'a T>)
    where
        S: BoundingShape + ?Sized,
    {
        let start = self.columns.lookup(from);
        for (object, &lon) in self.objects.iter().zip(self.columns.keys()).skip(start) {
            if lon > to {
                break;
            }
            if lon >= from && shape.contains(&object.location()) {
                out.push(object);
            }
        }
    }

    /// Improve `best` with the nearest object of this row.
    ///
    /// The three columns around `point`'s longitude are always evaluated.
    /// The walk then continues outwards for as long as the longitude gap to
    /// the remaining columns still allows a closer object. `cos_at` is the
    /// cosine of `point`'s latitude.
    pub(crate) fn nearest<'a>(&'a self, point: &Point<f64>, cos_at: f64, best: &mut Best<'a, T>) {
        let keys = self.columns.keys();
        let Some(last) = keys.len().checked_sub(1) else {
            return;
        };

        let index = self.columns.lookup(point.x());
        let low = index.saturating_sub(1);
        let high = (index + 1).min(last);
        for column in low..=high {
            self.consider(column, point, best);
        }

        // Smallest cosine of any latitude in the row.
        let row_cos = self
            .lat_min
            .to_radians()
            .cos()
            .min(self.lat_max.to_radians().cos())
            .max(0.0);
        let factor = cos_at * row_cos;

        let to_end = keys[last] - point.x();
        for column in high + 1..=last {
            let bound = longitude_bound(factor, keys[column] - point.x(), to_end);
            if beaten(best, bound) {
                break;
            }
            self.consider(column, point, best);
        }

        let to_start = keys[0] - point.x();
        for column in (0..low).rev() {
            let bound = longitude_bound(factor, keys[column] - point.x(), to_start);
            if beaten(best, bound) {
                break;
            }
            self.consider(column, point, best);
        }
    }

    fn consider<'a>(&'a self, column: usize, point: &Point<f64>, best: &mut Best<'a, T>) {
        let Some(object) = self.objects.get(column) else {
            return;
        };
        let distance = distance_meters(point, &object.location());
        if best.is_none_or(|(_, current)| distance < current) {
            *best = Some((object, distance));
        }
    }
}

impl<T> DataRow<T> {
    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in longitude order.
    pub fn objects(&self) -> &[T] {
        &self.objects
    }
}

/// Whether a candidate at `bound` meters or more cannot improve `best`.
#[inline]
pub(crate) fn beaten<T>(best: &Best<'_, T>, bound: f64) -> bool {
    best.is_some_and(|(_, current)| bound >= current)
}

/// Longitude gap folded into `[0, 180]` degrees. Gaps of a full turn or
/// more come from out-of-range coordinates and give no information.
#[inline]
fn wrapped_gap(delta: f64) -> f64 {
    let delta = delta.abs();
    if delta >= 360.0 {
        0.0
    } else {
        delta.min(360.0 - delta)
    }
}

/// Lower bound in meters on the distance to any object whose longitude
/// offset lies between `from` and `to` (both on the same side of the query
/// point). `factor` is the product of the query and row latitude cosines.
fn longitude_bound(factor: f64, from: f64, to: f64) -> f64 {
    let gap = wrapped_gap(from).min(wrapped_gap(to)).to_radians();
    let h = (factor * (gap / 2.0).sin().powi(2)).clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoindex_types::{BoundingBox, lat_lon};

    fn row(points: &[Point]) -> DataRow<Point> {
        DataRow::new(points.to_vec(), points.len())
    }

    #[test]
    fn test_row_sorted_by_longitude() {
        let row = row(&[lat_lon(1.0, 30.0), lat_lon(2.0, -10.0), lat_lon(0.5, 5.0)]);
        let lons: Vec<f64> = row.objects().iter().map(|p| p.x()).collect();
        assert_eq!(lons, vec![-10.0, 5.0, 30.0]);
        assert_eq!(row.lat_min(), 0.5);
        assert_eq!(row.lat_max(), 2.0);
    }

    #[test]
    fn test_collect_within_range() {
        let row = row(&[
            lat_lon(0.0, -20.0),
            lat_lon(0.0, -5.0),
            lat_lon(0.0, 0.0),
            lat_lon(0.0, 5.0),
            lat_lon(0.0, 20.0),
        ]);
        let everything = BoundingBox::new(lat_lon(-1.0, -180.0), lat_lon(1.0, 180.0));

        let mut out = Vec::new();
        row.collect_within(&everything, -5.0, 5.0, &mut out);
        assert_eq!(out.len(), 3);

        out.clear();
        row.collect_within(&everything, 21.0, f64::INFINITY, &mut out);
        assert!(out.is_empty());

        out.clear();
        row.collect_within(&everything, f64::NEG_INFINITY, -20.0, &mut out);
        assert_eq!(out, vec![&lat_lon(0.0, -20.0)]);
    }

    #[test]
    fn test_nearest_walks_past_window() {
        // The columns next to the query longitude are far away in latitude;
        // the nearest object is two columns further along.
        let row = row(&[
            lat_lon(20.0, -0.1),
            lat_lon(20.0, 0.1),
            lat_lon(20.0, 0.2),
            lat_lon(20.0, 0.3),
            lat_lon(0.0, 1.0),
        ]);

        let query = lat_lon(0.0, 0.0);
        let mut best = None;
        row.nearest(&query, 1.0, &mut best);
        assert_eq!(best.map(|(p, _)| *p), Some(lat_lon(0.0, 1.0)));
    }

    #[test]
    fn test_nearest_across_antimeridian() {
        let row = row(&[lat_lon(0.0, -179.0), lat_lon(0.0, 0.0), lat_lon(0.0, 150.0)]);
        let query = lat_lon(0.0, 179.5);
        let mut best = None;
        row.nearest(&query, 1.0, &mut best);
        assert_eq!(best.map(|(p, _)| *p), Some(lat_lon(0.0, -179.0)));
    }

    #[test]
    fn test_longitude_bound_is_below_distance() {
        let query = lat_lon(40.0, 0.0);
        let factor = 40f64.to_radians().cos() * 45f64.to_radians().cos();
        for lon in [1.0, 10.0, 90.0, 170.0, 200.0] {
            let bound = longitude_bound(factor, lon, lon);
            for lat in [35.0, 40.0, 45.0] {
                assert!(bound <= distance_meters(&query, &lat_lon(lat, lon)) + 1e-6);
            }
        }
        assert_eq!(wrapped_gap(-350.0), 10.0);
        assert_eq!(wrapped_gap(720.0), 0.0);
    }
}
