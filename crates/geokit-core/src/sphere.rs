//! Spherical-earth geometry: heading, distance, interpolation, geodesic
//! offset and polygon area.
//!
//! Points cross the public boundary in degrees; everything is computed in
//! radians on a sphere of radius [`EARTH_RADIUS`]. Longitudes produced here
//! are never wrapped unless a function says so; use [`LatLon::wrapped`].

use std::f64::consts::FRAC_PI_2;
use std::ops::{Add, Mul};

use log::trace;

use crate::coords::LatLon;
use crate::math::{arc_hav, hav_distance, to_degrees, to_radians, wrap, EARTH_RADIUS};

/// Below this `sin(angle)` two points are treated as coincident (or antipodal)
/// by [`interpolate`].
const SLERP_EPSILON: f64 = 1e-6;

/// A point on the unit sphere in Cartesian coordinates, the working space of
/// [`interpolate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn from_latlon(ll: LatLon) -> Self {
        let (lat, lon) = ll.to_radians();
        Self {
            x: lat.cos() * lon.cos(),
            y: lat.cos() * lon.sin(),
            z: lat.sin(),
        }
    }

    /// Back to degrees via `atan2`, so the vector need not be exactly unit length.
    pub fn to_latlon(self) -> LatLon {
        let lat = self.z.atan2(self.x.hypot(self.y));
        let lon = self.y.atan2(self.x);
        LatLon::new(to_degrees(lat), to_degrees(lon))
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y, z: self.z + other.z }
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        Self { x: self.x * s, y: self.y * s, z: self.z * s }
    }
}

/// Initial great-circle bearing from `from` to `to`, degrees clockwise from
/// north in [-180, 180).
pub fn compute_heading(from: LatLon, to: LatLon) -> f64 {
    let (from_lat, from_lng) = from.to_radians();
    let (to_lat, to_lng) = to.to_radians();
    let d_lng = to_lng - from_lng;

    let heading = (d_lng.sin() * to_lat.cos())
        .atan2(from_lat.cos() * to_lat.sin() - from_lat.sin() * to_lat.cos() * d_lng.cos());
    wrap(to_degrees(heading), -180.0, 180.0)
}

/// Point reached by travelling `distance` metres from `from` on initial
/// bearing `heading` (degrees clockwise from north).
///
/// The returned longitude is `from.lon` plus the travelled delta and may lie
/// outside [-180, 180).
pub fn compute_offset(from: LatLon, distance: f64, heading: f64) -> LatLon {
    let distance = distance / EARTH_RADIUS;
    let heading = to_radians(heading);
    let (from_lat, from_lng) = from.to_radians();

    let (sin_distance, cos_distance) = distance.sin_cos();
    let (sin_from_lat, cos_from_lat) = from_lat.sin_cos();
    let sin_lat = cos_distance * sin_from_lat + sin_distance * cos_from_lat * heading.cos();
    let d_lng = (sin_distance * cos_from_lat * heading.sin()).atan2(cos_distance - sin_from_lat * sin_lat);

    LatLon::new(to_degrees(sin_lat.asin()), to_degrees(from_lng + d_lng))
}

/// Origin from which travelling `distance` metres on initial bearing
/// `heading` ends at `to`.
///
/// Returns `None` when no origin exists: either the system has no real root
/// or both roots give a latitude outside [-90, 90]. That is an ordinary
/// answer for unreachable distance/heading pairs, not a failure.
pub fn compute_offset_origin(to: LatLon, distance: f64, heading: f64) -> Option<LatLon> {
    let heading = to_radians(heading);
    let distance = distance / EARTH_RADIUS;

    // sin(to_lat) = n1·sin(from_lat) + n2·cos(from_lat), solved as a quadratic in
    // b = cos(from_lat).
    let n1 = distance.cos();
    let n2 = distance.sin() * heading.cos();
    let n3 = distance.sin() * heading.sin();
    let n4 = to_radians(to.lat).sin();

    let n12 = n1 * n1;
    let discriminant = n2 * n2 * n12 + n12 * n12 - n12 * n4 * n4;
    if discriminant < 0.0 {
        trace!("offset origin: negative discriminant {discriminant} for {to}, d={distance} rad");
        return None;
    }

    let root = discriminant.sqrt();
    let solve = |root: f64| {
        let b = (n2 * n4 + root) / (n12 + n2 * n2);
        let a = (n4 - n2 * b) / n1;
        a.atan2(b)
    };
    let in_range = |lat: f64| (-FRAC_PI_2..=FRAC_PI_2).contains(&lat);

    // One root usually lands outside [-π/2, π/2]; try + first, then −.
    let Some(from_lat) = [root, -root].into_iter().map(solve).find(|&lat| in_range(lat)) else {
        trace!("offset origin: both roots out of range for {to}, d={distance} rad");
        return None;
    };

    let from_lng = to_radians(to.lon) - n3.atan2(n1 * from_lat.cos() - n2 * from_lat.sin());
    Some(LatLon::new(to_degrees(from_lat), to_degrees(from_lng)))
}

/// Point `fraction` of the way from `from` to `to` along the great circle
/// (slerp). `fraction` is normally in [0, 1].
///
/// Coincident or antipodal endpoints have no unique great circle; `from` is
/// returned unchanged.
pub fn interpolate(from: LatLon, to: LatLon, fraction: f64) -> LatLon {
    let angle = compute_angle_between(from, to);
    let sin_angle = angle.sin();
    if sin_angle < SLERP_EPSILON {
        trace!("interpolate: degenerate arc {from} -> {to}, returning origin");
        return from;
    }

    let a = ((1.0 - fraction) * angle).sin() / sin_angle;
    let b = (fraction * angle).sin() / sin_angle;

    (Vec3::from_latlon(from) * a + Vec3::from_latlon(to) * b).to_latlon()
}

/// Distance on the unit sphere; arguments and result in radians.
pub fn distance_radians(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    arc_hav(hav_distance(lat1, lat2, lng1 - lng2))
}

/// Central angle between two points, radians in [0, π].
pub fn compute_angle_between(from: LatLon, to: LatLon) -> f64 {
    let (lat1, lng1) = from.to_radians();
    let (lat2, lng2) = to.to_radians();
    distance_radians(lat1, lng1, lat2, lng2)
}

/// Great-circle distance in metres.
pub fn compute_distance_between(from: LatLon, to: LatLon) -> f64 {
    compute_angle_between(from, to) * EARTH_RADIUS
}

/// Length of an open polyline in metres. Fewer than two points → 0.
pub fn compute_length(path: &[LatLon]) -> f64 {
    path.windows(2)
        .map(|pair| compute_angle_between(pair[0], pair[1]))
        .sum::<f64>()
        * EARTH_RADIUS
}

/// Unsigned area of a closed path in square metres.
pub fn compute_area(path: &[LatLon]) -> f64 {
    compute_signed_area(path).abs()
}

/// Signed area of a closed path on the earth, square metres.
/// See [`compute_signed_area_with_radius`].
pub fn compute_signed_area(path: &[LatLon]) -> f64 {
    compute_signed_area_with_radius(path, EARTH_RADIUS)
}

/// Signed area of a closed path on a sphere of the given radius, in units of
/// `radius²`.
///
/// The last point connects back to the first. "Inside" is the region that
/// does not contain the South Pole, so a counter-clockwise ring (seen from
/// above) is positive. Fewer than three points → 0.
pub fn compute_signed_area_with_radius(path: &[LatLon], radius: f64) -> f64 {
    if path.len() < 3 {
        return 0.0;
    }
    let last = path[path.len() - 1];

    let co_lat_tan = |ll: LatLon| ((FRAC_PI_2 - to_radians(ll.lat)) / 2.0).tan();

    // Sum the polar triangles formed by each edge and the North Pole, starting
    // with the closing edge last -> first.
    let mut prev_tan = co_lat_tan(last);
    let mut prev_lng = to_radians(last.lon);
    let mut total = 0.0;
    for &point in path {
        let tan = co_lat_tan(point);
        let lng = to_radians(point.lon);
        total += polar_triangle_area(tan, lng, prev_tan, prev_lng);
        prev_tan = tan;
        prev_lng = lng;
    }

    total * (radius * radius)
}

/// Signed area of the triangle with the North Pole as one vertex, on the unit
/// sphere. `tan1`/`tan2` are `tan((π/2 − lat) / 2)` of the other two vertices.
///
/// Todhunter, *Spherical Trigonometry*, §103: area from two sides and the
/// included angle.
pub fn polar_triangle_area(tan1: f64, lng1: f64, tan2: f64, lng2: f64) -> f64 {
    let delta_lng = lng1 - lng2;
    let t = tan1 * tan2;
    2.0 * (t * delta_lng.sin()).atan2(1.0 + t * delta_lng.cos())
}
