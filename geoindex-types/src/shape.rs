//! Bounding shapes consumed by the indexes.
//!
//! Every shape reports an axis-aligned envelope (`lower_left` / `upper_right`)
//! that the indexes use to localize candidates, and an exact `contains`
//! predicate that decides membership.

use crate::point::{Located, distance_meters, moved_by_meters};
use geo::{BoundingRect, Intersects, LineString, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A region on the globe with an axis-aligned envelope.
pub trait BoundingShape {
    /// South-west corner of the envelope.
    fn lower_left(&self) -> Point<f64>;

    /// North-east corner of the envelope.
    fn upper_right(&self) -> Point<f64>;

    /// Center of the shape; the envelope midpoint unless a shape knows better.
    fn center(&self) -> Point<f64> {
        let ll = self.lower_left();
        let ur = self.upper_right();
        Point::new((ll.x() + ur.x()) / 2.0, (ll.y() + ur.y()) / 2.0)
    }

    /// Exact membership test.
    fn contains(&self, point: &Point<f64>) -> bool;

    /// True when the envelope's lower-left longitude exceeds its upper-right
    /// longitude, i.e. the envelope crosses the ±180° meridian.
    fn wraps_antimeridian(&self) -> bool {
        self.lower_left().x() > self.upper_right().x()
    }
}

/// Boxed shape used by the composite shapes.
pub type DynShape = Box<dyn BoundingShape + Send + Sync>;

impl<S: BoundingShape + ?Sized> BoundingShape for &S {
    fn lower_left(&self) -> Point<f64> {
        (**self).lower_left()
    }

    fn upper_right(&self) -> Point<f64> {
        (**self).upper_right()
    }

    fn center(&self) -> Point<f64> {
        (**self).center()
    }

    fn contains(&self, point: &Point<f64>) -> bool {
        (**self).contains(point)
    }
}

impl<S: BoundingShape + ?Sized> BoundingShape for Box<S> {
    fn lower_left(&self) -> Point<f64> {
        (**self).lower_left()
    }

    fn upper_right(&self) -> Point<f64> {
        (**self).upper_right()
    }

    fn center(&self) -> Point<f64> {
        (**self).center()
    }

    fn contains(&self, point: &Point<f64>) -> bool {
        (**self).contains(point)
    }
}

impl BoundingShape for Rect<f64> {
    fn lower_left(&self) -> Point<f64> {
        self.min().into()
    }

    fn upper_right(&self) -> Point<f64> {
        self.max().into()
    }

    fn contains(&self, point: &Point<f64>) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x() >= min.x && point.x() <= max.x && point.y() >= min.y && point.y() <= max.y
    }
}

/// Axis-aligned latitude/longitude box, edges inclusive.
///
/// A box whose lower-left longitude is greater than its upper-right longitude
/// is read as wrapping the antimeridian: it contains longitudes east of the
/// lower-left corner *or* west of the upper-right corner.
///
/// # Examples
///
/// ```
/// use geoindex_types::{BoundingBox, BoundingShape, lat_lon};
///
/// let fiji = BoundingBox::new(lat_lon(-21.0, 176.0), lat_lon(-12.0, -178.0));
/// assert!(fiji.wraps_antimeridian());
/// assert!(fiji.contains(&lat_lon(-17.7, 178.0)));
/// assert!(fiji.contains(&lat_lon(-16.0, -179.9)));
/// assert!(!fiji.contains(&lat_lon(-17.7, 170.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    lower_left: Point<f64>,
    upper_right: Point<f64>,
}

impl BoundingBox {
    /// Create a box from its corners.
    pub fn new(lower_left: Point<f64>, upper_right: Point<f64>) -> Self {
        Self {
            lower_left,
            upper_right,
        }
    }

    /// Smallest box holding every object, or `None` for an empty input.
    pub fn from_points<I>(objects: I) -> Option<Self>
    where
        I: IntoIterator,
        I::Item: Located,
    {
        let mut iter = objects.into_iter();
        let first = iter.next()?.location();
        let bounds = iter.fold(Self::new(first, first), |bounds, object| {
            bounds.include_point(&object.location())
        });
        Some(bounds)
    }

    /// Square box reaching `max_distance` meters from `center` in each
    /// cardinal direction.
    pub fn around_point(center: &Point<f64>, max_distance: f64) -> Self {
        Self::new(
            moved_by_meters(center, -max_distance, -max_distance),
            moved_by_meters(center, max_distance, max_distance),
        )
    }

    /// Smallest box covering the envelopes of both shapes.
    pub fn covering<A, B>(a: &A, b: &B) -> Self
    where
        A: BoundingShape + ?Sized,
        B: BoundingShape + ?Sized,
    {
        let (all, aur) = (a.lower_left(), a.upper_right());
        let (bll, bur) = (b.lower_left(), b.upper_right());
        Self::new(
            Point::new(all.x().min(bll.x()), all.y().min(bll.y())),
            Point::new(aur.x().max(bur.x()), aur.y().max(bur.y())),
        )
    }

    /// Overlap of two boxes. Disjoint inputs produce an inverted box that
    /// contains nothing on the latitude axis.
    pub fn intersect(a: &Self, b: &Self) -> Self {
        Self::new(
            Point::new(
                a.lower_left.x().max(b.lower_left.x()),
                a.lower_left.y().max(b.lower_left.y()),
            ),
            Point::new(
                a.upper_right.x().min(b.upper_right.x()),
                a.upper_right.y().min(b.upper_right.y()),
            ),
        )
    }

    /// This box grown just enough to hold `point`.
    #[must_use]
    pub fn include_point(&self, point: &Point<f64>) -> Self {
        if self.contains(point) {
            return *self;
        }

        Self::new(
            Point::new(
                self.lower_left.x().min(point.x()),
                self.lower_left.y().min(point.y()),
            ),
            Point::new(
                self.upper_right.x().max(point.x()),
                self.upper_right.y().max(point.y()),
            ),
        )
    }

    /// This box expanded by `range` meters on every side.
    #[must_use]
    pub fn grow_by(&self, range: f64) -> Self {
        Self::new(
            moved_by_meters(&self.lower_left, -range, -range),
            moved_by_meters(&self.upper_right, range, range),
        )
    }
}

impl BoundingShape for BoundingBox {
    fn lower_left(&self) -> Point<f64> {
        self.lower_left
    }

    fn upper_right(&self) -> Point<f64> {
        self.upper_right
    }

    fn center(&self) -> Point<f64> {
        let lat = (self.lower_left.y() + self.upper_right.y()) / 2.0;
        if !self.wraps_antimeridian() {
            return Point::new((self.lower_left.x() + self.upper_right.x()) / 2.0, lat);
        }

        let mut lon = (self.lower_left.x() + self.upper_right.x() + 360.0) / 2.0;
        if lon > 180.0 {
            lon -= 360.0;
        }
        Point::new(lon, lat)
    }

    fn contains(&self, point: &Point<f64>) -> bool {
        let (lat, lon) = (point.y(), point.x());
        if lat < self.lower_left.y() || lat > self.upper_right.y() {
            return false;
        }

        if self.wraps_antimeridian() {
            lon >= self.lower_left.x() || lon <= self.upper_right.x()
        } else {
            lon >= self.lower_left.x() && lon <= self.upper_right.x()
        }
    }
}

/// Circle of `radius` meters around a center.
///
/// Containment first tries the inscribed box (cheap accept) and the
/// circumscribed box (cheap reject) before computing a haversine distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingCircle {
    center: Point<f64>,
    radius: f64,
    bounds: BoundingBox,
    inner: BoundingBox,
}

impl BoundingCircle {
    /// Create a circle; `radius` is in meters.
    pub fn new(center: Point<f64>, radius: f64) -> Self {
        Self {
            center,
            radius,
            bounds: BoundingBox::around_point(&center, radius),
            inner: BoundingBox::around_point(&center, radius / std::f64::consts::SQRT_2),
        }
    }

    /// Radius in meters.
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl BoundingShape for BoundingCircle {
    fn lower_left(&self) -> Point<f64> {
        self.bounds.lower_left()
    }

    fn upper_right(&self) -> Point<f64> {
        self.bounds.upper_right()
    }

    fn center(&self) -> Point<f64> {
        self.center
    }

    fn contains(&self, point: &Point<f64>) -> bool {
        if self.inner.contains(point) {
            return true;
        }

        self.bounds.contains(point) && distance_meters(&self.center, point) <= self.radius
    }
}

/// Points inside *any* of the member shapes.
pub struct UnionShape {
    bounds: BoundingBox,
    shapes: Vec<DynShape>,
}

impl UnionShape {
    /// Start a union from its first member.
    pub fn new<S: BoundingShape + Send + Sync + 'static>(first: S) -> Self {
        let bounds = BoundingBox::new(first.lower_left(), first.upper_right());
        Self {
            bounds,
            shapes: vec![Box::new(first)],
        }
    }

    /// Build a union from boxed members, `None` when there are none.
    pub fn from_shapes<I: IntoIterator<Item = DynShape>>(shapes: I) -> Option<Self> {
        let mut iter = shapes.into_iter();
        let first = iter.next()?;
        let mut union = Self {
            bounds: BoundingBox::new(first.lower_left(), first.upper_right()),
            shapes: vec![first],
        };
        for shape in iter {
            union.push_boxed(shape);
        }
        Some(union)
    }

    /// Add a member shape, widening the envelope.
    pub fn push<S: BoundingShape + Send + Sync + 'static>(&mut self, shape: S) {
        self.push_boxed(Box::new(shape));
    }

    fn push_boxed(&mut self, shape: DynShape) {
        self.bounds = BoundingBox::covering(&self.bounds, &shape);
        self.shapes.push(shape);
    }

    /// Number of member shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Always false; a union has at least one member.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl fmt::Debug for UnionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionShape")
            .field("bounds", &self.bounds)
            .field("shapes", &self.shapes.len())
            .finish()
    }
}

impl BoundingShape for UnionShape {
    fn lower_left(&self) -> Point<f64> {
        self.bounds.lower_left()
    }

    fn upper_right(&self) -> Point<f64> {
        self.bounds.upper_right()
    }

    fn center(&self) -> Point<f64> {
        self.bounds.center()
    }

    fn contains(&self, point: &Point<f64>) -> bool {
        self.bounds.contains(point) && self.shapes.iter().any(|shape| shape.contains(point))
    }
}

/// Points inside *every* member shape.
///
/// The envelope is the covering box of the members, which is loose but safe
/// for candidate localization.
pub struct IntersectionShape {
    bounds: BoundingBox,
    shapes: Vec<DynShape>,
}

impl IntersectionShape {
    /// Start an intersection from its first member.
    pub fn new<S: BoundingShape + Send + Sync + 'static>(first: S) -> Self {
        let bounds = BoundingBox::new(first.lower_left(), first.upper_right());
        Self {
            bounds,
            shapes: vec![Box::new(first)],
        }
    }

    /// Intersection of two shapes.
    pub fn of<A, B>(a: A, b: B) -> Self
    where
        A: BoundingShape + Send + Sync + 'static,
        B: BoundingShape + Send + Sync + 'static,
    {
        let mut shape = Self::new(a);
        shape.push(b);
        shape
    }

    /// Add a member shape.
    pub fn push<S: BoundingShape + Send + Sync + 'static>(&mut self, shape: S) {
        self.bounds = BoundingBox::covering(&self.bounds, &shape);
        self.shapes.push(Box::new(shape));
    }

    /// Number of member shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Always false; an intersection has at least one member.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl fmt::Debug for IntersectionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntersectionShape")
            .field("bounds", &self.bounds)
            .field("shapes", &self.shapes.len())
            .finish()
    }
}

impl BoundingShape for IntersectionShape {
    fn lower_left(&self) -> Point<f64> {
        self.bounds.lower_left()
    }

    fn upper_right(&self) -> Point<f64> {
        self.bounds.upper_right()
    }

    fn center(&self) -> Point<f64> {
        self.bounds.center()
    }

    fn contains(&self, point: &Point<f64>) -> bool {
        self.bounds.contains(point) && self.shapes.iter().all(|shape| shape.contains(point))
    }
}

/// A closed ring, typically a concave hull around a set of points.
///
/// Points on the boundary count as inside.
#[derive(Debug, Clone, PartialEq)]
pub struct HullShape {
    polygon: Polygon<f64>,
    bounds: BoundingBox,
}

impl HullShape {
    /// Wrap a polygon; `None` when it has no coordinates.
    pub fn new(polygon: Polygon<f64>) -> Option<Self> {
        let rect = polygon.bounding_rect()?;
        Some(Self {
            bounds: BoundingBox::new(rect.min().into(), rect.max().into()),
            polygon,
        })
    }

    /// Build a hull from its vertices in ring order. The ring is closed
    /// automatically.
    pub fn from_vertices<I: IntoIterator<Item = Point<f64>>>(vertices: I) -> Option<Self> {
        let ring: LineString<f64> = vertices.into_iter().collect();
        Self::new(Polygon::new(ring, Vec::new()))
    }

    /// The underlying polygon.
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }
}

impl BoundingShape for HullShape {
    fn lower_left(&self) -> Point<f64> {
        self.bounds.lower_left()
    }

    fn upper_right(&self) -> Point<f64> {
        self.bounds.upper_right()
    }

    fn contains(&self, point: &Point<f64>) -> bool {
        self.bounds.contains(point) && self.polygon.intersects(point)
    }
}
