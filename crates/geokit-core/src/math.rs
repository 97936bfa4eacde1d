//! Scalar helpers shared by the tile and sphere modules.
//! Angles are in radians unless a name says otherwise.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Mean earth radius in metres (IUGG).
pub const EARTH_RADIUS: f64 = 6_371_009.0;

/// Restrict `x` to `[low, high]`.
#[inline]
pub fn clamp(x: f64, low: f64, high: f64) -> f64 {
    if x < low {
        low
    } else if x > high {
        high
    } else {
        x
    }
}

/// Wrap `n` into the half-open interval `[min, max)`.
/// Values already in range are returned untouched.
#[inline]
pub fn wrap(n: f64, min: f64, max: f64) -> f64 {
    if n >= min && n < max {
        n
    } else {
        modulo(n - min, max - min) + min
    }
}

/// Non-negative remainder of `x / m`, for `m > 0`.
#[inline]
pub fn modulo(x: f64, m: f64) -> f64 {
    ((x % m) + m) % m
}

/// Mercator y for a latitude. Diverges at the poles.
pub fn mercator(lat: f64) -> f64 {
    (lat * 0.5 + FRAC_PI_4).tan().ln()
}

/// Latitude for a Mercator y.
pub fn inverse_mercator(y: f64) -> f64 {
    2.0 * y.exp().atan() - FRAC_PI_2
}

/// `hav(x) = (1 - cos x) / 2 = sin²(x / 2)`.
#[inline]
pub fn hav(x: f64) -> f64 {
    let sin_half = (x * 0.5).sin();
    sin_half * sin_half
}

/// Inverse haversine, `2 · asin(sqrt(h))`. Stable near 0.
///
/// The argument is clamped into `[0, 1]` first: sums of haversines can drift
/// a few ulps outside the domain and must not turn into NaN.
#[inline]
pub fn arc_hav(h: f64) -> f64 {
    2.0 * clamp(h, 0.0, 1.0).sqrt().asin()
}

/// Given `h = hav(x)`, returns `sin(|x|)`.
pub fn sin_from_hav(h: f64) -> f64 {
    2.0 * (h * (1.0 - h)).sqrt()
}

/// `hav(asin(x))`.
pub fn hav_from_sin(x: f64) -> f64 {
    let x2 = x * x;
    x2 / (1.0 + (1.0 - x2).sqrt()) * 0.5
}

/// `sin(arc_hav(x) + arc_hav(y))`.
pub fn sin_sum_from_hav(x: f64, y: f64) -> f64 {
    let a = (x * (1.0 - x)).sqrt();
    let b = (y * (1.0 - y)).sqrt();
    2.0 * (a + b - 2.0 * (a * y + b * x))
}

/// Haversine of the central angle between two points on the unit sphere,
/// given both latitudes and the longitude delta.
#[inline]
pub fn hav_distance(lat1: f64, lat2: f64, d_lng: f64) -> f64 {
    hav(lat1 - lat2) + hav(d_lng) * lat1.cos() * lat2.cos()
}

#[inline]
pub fn to_radians(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

#[inline]
pub fn to_degrees(radians: f64) -> f64 {
    radians * (180.0 / PI)
}
