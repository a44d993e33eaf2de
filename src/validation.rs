//! Validation for coordinates entering an index.
//!
//! Only finiteness is enforced. Whether a latitude lies within ±90 or a
//! longitude within ±180 is left to the caller; out-of-range values are
//! stored as-is. The quad tree files them under the nearest edge of the
//! world and clamps them the same way when it searches.

use crate::error::{GeoIndexError, Result};
use geo::Point;

/// Rejects a point with a NaN or infinite ordinate.
///
/// # Examples
///
/// ```
/// use geoindex::validation::validate_location;
/// use geo::Point;
///
/// assert!(validate_location(&Point::new(-74.0060, 40.7128)).is_ok());
/// assert!(validate_location(&Point::new(f64::NAN, 40.0)).is_err());
///
/// // Range is not checked.
/// assert!(validate_location(&Point::new(200.0, 40.0)).is_ok());
/// ```
pub fn validate_location(point: &Point) -> Result<()> {
    let (x, y) = (point.x(), point.y());

    if !x.is_finite() {
        log::warn!("Rejecting location with non-finite longitude {}", x);
        return Err(GeoIndexError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            x
        )));
    }

    if !y.is_finite() {
        log::warn!("Rejecting location with non-finite latitude {}", y);
        return Err(GeoIndexError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            y
        )));
    }

    Ok(())
}

/// Validates every point, reporting the first offending index.
pub fn validate_locations<'a, I>(points: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Point>,
{
    for (i, point) in points.into_iter().enumerate() {
        validate_location(point).map_err(|e| {
            GeoIndexError::InvalidInput(format!("Object at index {}: {}", i, e))
        })?;
    }
    Ok(())
}
