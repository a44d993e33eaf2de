use geo::Point;

/// Earth radius in meters used for every haversine computation in this crate.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Anything that sits at a single geographic coordinate.
///
/// This is the only accessor the indexes require of stored objects.
///
/// # Examples
///
/// ```
/// use geoindex_types::{Located, lat_lon};
/// use geo::Point;
///
/// struct Cafe {
///     name: &'static str,
///     at: Point,
/// }
///
/// impl Located for Cafe {
///     fn location(&self) -> Point {
///         self.at
///     }
/// }
///
/// let cafe = Cafe { name: "Gufo", at: lat_lon(45.07, 7.68) };
/// assert_eq!(cafe.location().y(), 45.07);
/// # let _ = cafe.name;
/// ```
pub trait Located {
    /// The object's coordinate (`x` = longitude, `y` = latitude).
    fn location(&self) -> Point<f64>;
}

impl Located for Point<f64> {
    fn location(&self) -> Point<f64> {
        *self
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn location(&self) -> Point<f64> {
        (**self).location()
    }
}

impl<T: Located + ?Sized> Located for Box<T> {
    fn location(&self) -> Point<f64> {
        (**self).location()
    }
}

impl<T: Located, V> Located for (T, V) {
    fn location(&self) -> Point<f64> {
        self.0.location()
    }
}

/// Build a point from latitude and longitude, in that order.
///
/// `geo::Point::new` takes `(x, y)` which is `(lon, lat)`; this helper exists
/// so call sites that think in lat/lon read naturally.
#[inline]
pub fn lat_lon(lat: f64, lon: f64) -> Point<f64> {
    Point::new(lon, lat)
}

/// Haversine great-circle distance in meters.
///
/// Symmetric, and zero iff both coordinates are equal. Coordinates are not
/// range-checked; passing latitudes outside ±90 is the caller's problem.
///
/// # Examples
///
/// ```
/// use geoindex_types::{distance_meters, lat_lon};
///
/// let paris = lat_lon(48.8566, 2.3522);
/// let london = lat_lon(51.5074, -0.1278);
/// let d = distance_meters(&paris, &london);
/// assert!((d - 343_500.0).abs() < 1_000.0);
/// ```
#[inline]
pub fn distance_meters(a: &Point<f64>, b: &Point<f64>) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let delta_lat = (b.y() - a.y()).to_radians();
    let delta_lon = (b.x() - a.x()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Meters covered by one degree of latitude at `at`.
///
/// One haversine evaluation; lets callers turn latitude gaps into distance
/// lower bounds without further trigonometry.
#[inline]
pub fn meters_per_degree_latitude(at: &Point<f64>) -> f64 {
    distance_meters(at, &Point::new(at.x(), at.y() + 1.0))
}

/// Move `at` by the given number of meters north (`d_lat`) and east (`d_lon`).
///
/// Uses the local meters-per-degree scale, so it is only accurate for
/// distances that are small compared to the Earth radius. A move across the
/// antimeridian comes back out on the other side (179.9 + 0.2 is -179.9).
/// At a pole the longitude scale collapses and any east/west move yields an
/// infinite longitude, which bounding boxes then read as "every longitude".
pub fn moved_by_meters(at: &Point<f64>, d_lat: f64, d_lon: f64) -> Point<f64> {
    let per_degree_lat = meters_per_degree_latitude(at);
    let per_degree_lon = distance_meters(at, &Point::new(at.x() + 1.0, at.y()));

    let lat = at.y() + d_lat / per_degree_lat;
    let lon = if d_lon == 0.0 {
        at.x()
    } else {
        let lon = at.x() + d_lon / per_degree_lon;
        if lon > 180.0 {
            lon - 360.0
        } else if lon < -180.0 {
            lon + 360.0
        } else {
            lon
        }
    };

    Point::new(lon, lat)
}

/// Whether both ordinates are finite.
#[inline]
pub fn is_finite(point: &Point<f64>) -> bool {
    point.x().is_finite() && point.y().is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_symmetric_and_zero() {
        let a = lat_lon(40.7128, -74.0060);
        let b = lat_lon(34.0522, -118.2437);

        assert_eq!(distance_meters(&a, &b), distance_meters(&b, &a));
        assert_eq!(distance_meters(&a, &a), 0.0);
        assert!(distance_meters(&a, &b) > 3_900_000.0);
    }

    #[test]
    fn test_distance_across_antimeridian() {
        let west = lat_lon(0.0, 179.5);
        let east = lat_lon(0.0, -179.5);
        let one_degree = meters_per_degree_latitude(&west);

        assert!((distance_meters(&west, &east) - one_degree).abs() < 1.0);
    }

    #[test]
    fn test_meters_per_degree() {
        let d = meters_per_degree_latitude(&lat_lon(45.0, 7.0));
        assert!((d - 111_194.9).abs() < 1.0);
    }

    #[test]
    fn test_moved_by_meters() {
        let origin = lat_lon(10.0, 20.0);
        let moved = moved_by_meters(&origin, 1_000.0, -1_000.0);

        assert!(moved.y() > origin.y());
        assert!(moved.x() < origin.x());
        assert!((distance_meters(&origin, &lat_lon(moved.y(), origin.x())) - 1_000.0).abs() < 1.0);

        let unmoved = moved_by_meters(&origin, 0.0, 0.0);
        assert_eq!(unmoved, origin);

        let east = moved_by_meters(&lat_lon(0.0, 179.9), 0.0, 50_000.0);
        assert!(east.x() < -179.0);
        let west = moved_by_meters(&lat_lon(0.0, -179.9), 0.0, -50_000.0);
        assert!(west.x() > 179.0);
    }

    #[test]
    fn test_located_impls() {
        let p = lat_lon(1.0, 2.0);
        assert_eq!((&p).location(), p);
        assert_eq!((p, "tag").location(), p);
        assert_eq!(Box::new(p).location(), p);
        assert!(is_finite(&p));
        assert!(!is_finite(&lat_lon(f64::NAN, 0.0)));
    }
}
