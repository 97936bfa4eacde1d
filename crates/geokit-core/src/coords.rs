//! Geographic coordinate types and slippy-map tile addressing.
//! All coordinate math uses f64 for precision.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GeoError, GeoResult};
use crate::math::{to_degrees, to_radians, wrap};

/// Deepest zoom level whose tile indices still fit comfortably in `u32`.
pub const MAX_ZOOM: u32 = 30;

/// Latitude at which the Web Mercator square ends (atan(sinh(π)) in degrees).
/// Tile rows are only meaningful between ±this value.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// A point on the sphere in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees, -90 to +90.
    pub lat: f64,
    /// Longitude in degrees, conventionally -180 to +180. Not wrapped on construction.
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Checked constructor for values coming from outside the process.
    pub fn try_new(lat: f64, lon: f64) -> GeoResult<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(GeoError::NonFinite { lat, lon });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidLatitude(lat));
        }
        Ok(Self { lat, lon })
    }

    /// Copy of this point with longitude wrapped into [-180, 180).
    pub fn wrapped(self) -> Self {
        Self { lat: self.lat, lon: wrap(self.lon, -180.0, 180.0) }
    }

    /// Convert to radians.
    pub fn to_radians(self) -> (f64, f64) {
        (to_radians(self.lat), to_radians(self.lon))
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

impl FromStr for LatLon {
    type Err = GeoError;

    /// Parses `lat,lon` in degrees, e.g. `-33.92,18.42`. Latitude is range checked.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GeoError::InvalidPoint(s.to_string());
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let lat = lat.trim().parse().map_err(|_| invalid())?;
        let lon = lon.trim().parse().map_err(|_| invalid())?;
        Self::try_new(lat, lon)
    }
}

/// Number of tiles along one side of the grid at `zoom`.
/// Infinite past zoom 1023; indices then saturate at `u32::MAX`.
#[inline]
fn tiles_per_side(zoom: u32) -> f64 {
    2f64.powi(zoom.min(1024) as i32)
}

/// Floor a fractional grid position and pin it inside the grid.
/// Total for every zoom: the `as u32` cast saturates above `u32::MAX`.
fn grid_index(pos: f64, zoom: u32) -> u32 {
    let last = tiles_per_side(zoom) - 1.0;
    pos.floor().max(0.0).min(last) as u32
}

/// Longitude of a (possibly fractional or one-past-the-end) column edge.
fn edge_longitude(x: f64, zoom: u32) -> f64 {
    x / tiles_per_side(zoom) * 360.0 - 180.0
}

/// Latitude of a (possibly fractional or one-past-the-end) row edge.
fn edge_latitude(y: f64, zoom: u32) -> f64 {
    let n = std::f64::consts::PI - 2.0 * std::f64::consts::PI * y / tiles_per_side(zoom);
    to_degrees(n.sinh().atan())
}

/// Tile column containing `lon` at `zoom`.
/// lon = 180 lands in the last column instead of falling off the grid.
pub fn tile_x(lon: f64, zoom: u32) -> u32 {
    grid_index((lon + 180.0) / 360.0 * tiles_per_side(zoom), zoom)
}

/// Tile row containing `lat` at `zoom`.
///
/// The Mercator formula diverges at the poles and is only evaluated within
/// ±[`MAX_MERCATOR_LAT`]. Latitudes beyond that are clamped first, so they
/// land on the first or last row: a saturation policy, not the formula.
pub fn tile_y(lat: f64, zoom: u32) -> u32 {
    let lat_rad = to_radians(lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT));
    let merc = (lat_rad.tan() + 1.0 / lat_rad.cos()).ln();
    grid_index((1.0 - merc / std::f64::consts::PI) / 2.0 * tiles_per_side(zoom), zoom)
}

/// Longitude of the west edge of column `x`.
pub fn tile_to_longitude(x: u32, zoom: u32) -> f64 {
    edge_longitude(x as f64, zoom)
}

/// Latitude of the north edge of row `y`.
pub fn tile_to_latitude(y: u32, zoom: u32) -> f64 {
    edge_latitude(y as f64, zoom)
}

/// Tiles below `min_zoom` down to and including `max_zoom`: Σ 4^i for i in 1..=(max − min).
/// The tile at `min_zoom` itself is not counted.
pub fn total_tiles(min_zoom: u32, max_zoom: u32) -> u64 {
    (1..=max_zoom.saturating_sub(min_zoom)).fold(0u64, |total, i| total.saturating_add(4u64.saturating_pow(i)))
}

/// `z/x/y.png` path of the tile containing (lat, lon).
pub fn tile_path(lat: f64, lon: f64, zoom: u32) -> String {
    TileAddr::from_latlon(LatLon::new(lat, lon), zoom).path("png")
}

/// Geographic bounding box of a tile, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileBounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

/// A tile in a slippy-map (zoom/x/y) addressing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileAddr {
    pub zoom: u32,
    pub x: u32,
    pub y: u32,
}

impl TileAddr {
    pub fn new(zoom: u32, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Checked constructor: zoom must be at most [`MAX_ZOOM`] and x, y inside the grid.
    pub fn try_new(zoom: u32, x: u32, y: u32) -> GeoResult<Self> {
        if zoom > MAX_ZOOM {
            return Err(GeoError::ZoomOutOfRange { zoom, max: MAX_ZOOM });
        }
        let side = 1u32 << zoom;
        if x >= side || y >= side {
            return Err(GeoError::TileOutOfRange { zoom, x, y });
        }
        Ok(Self { zoom, x, y })
    }

    /// Convert a LatLon to the tile containing it at the given zoom level.
    pub fn from_latlon(ll: LatLon, zoom: u32) -> Self {
        Self { zoom, x: tile_x(ll.lon, zoom), y: tile_y(ll.lat, zoom) }
    }

    pub fn bounds(&self) -> TileBounds {
        TileBounds {
            min_lat: edge_latitude(self.y as f64 + 1.0, self.zoom),
            min_lon: tile_to_longitude(self.x, self.zoom),
            max_lat: tile_to_latitude(self.y, self.zoom),
            max_lon: edge_longitude(self.x as f64 + 1.0, self.zoom),
        }
    }

    /// Return the center LatLon of this tile.
    pub fn center(&self) -> LatLon {
        let b = self.bounds();
        LatLon::new((b.min_lat + b.max_lat) / 2.0, (b.min_lon + b.max_lon) / 2.0)
    }

    /// Whether `ll` falls inside this tile's bounds, edges included.
    pub fn contains(&self, ll: LatLon) -> bool {
        let b = self.bounds();
        (b.min_lat..=b.max_lat).contains(&ll.lat) && (b.min_lon..=b.max_lon).contains(&ll.lon)
    }

    /// Tile server path, e.g. `3/4/2.png` for `ext = "png"`.
    pub fn path(&self, ext: &str) -> String {
        format!("{}/{}/{}.{ext}", self.zoom, self.x, self.y)
    }

    /// Enclosing tile one zoom level up; `None` at zoom 0.
    pub fn parent(&self) -> Option<Self> {
        let zoom = self.zoom.checked_sub(1)?;
        Some(Self { zoom, x: self.x >> 1, y: self.y >> 1 })
    }

    /// The four tiles one zoom level down, row-major.
    /// `None` at [`MAX_ZOOM`] and beyond, where child indices leave `u32`.
    pub fn children(&self) -> Option<[Self; 4]> {
        if self.zoom >= MAX_ZOOM {
            return None;
        }
        let (zoom, x, y) = (self.zoom + 1, self.x << 1, self.y << 1);
        Some([
            Self { zoom, x, y },
            Self { zoom, x: x + 1, y },
            Self { zoom, x, y: y + 1 },
            Self { zoom, x: x + 1, y: y + 1 },
        ])
    }
}

impl fmt::Display for TileAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

impl FromStr for TileAddr {
    type Err = GeoError;

    /// Parses `z/x/y`, ignoring a trailing extension on `y` (`3/4/2.png`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GeoError::InvalidTilePath(s.to_string());

        let mut parts = s.trim().split('/');
        let (Some(z), Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let y = y.split_once('.').map_or(y, |(stem, _)| stem);

        let zoom = z.parse().map_err(|_| invalid())?;
        let x = x.parse().map_err(|_| invalid())?;
        let y = y.parse().map_err(|_| invalid())?;
        Self::try_new(zoom, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn zoom_one_center() {
        assert_eq!(tile_x(0.0, 1), 1);
        assert_eq!(tile_y(0.0, 1), 1);
        assert_eq!(tile_x(-180.0, 1), 0);
        assert_eq!(tile_y(45.0, 1), 0);
    }

    #[test]
    fn known_tile() {
        // Berlin at z10 is tile 550/335 on openstreetmap.org.
        let tile = TileAddr::from_latlon(LatLon::new(52.52, 13.405), 10);
        assert_eq!(tile, TileAddr::new(10, 550, 335));
    }

    #[test]
    fn edges_are_pinned_to_grid() {
        assert_eq!(tile_x(180.0, 3), 7);
        assert_eq!(tile_y(90.0, 3), 0);
        assert_eq!(tile_y(-90.0, 3), 7);
    }

    #[test]
    fn zoom_past_u32_grid_saturates() {
        // 2^32 columns: lon = 180 lands on the last one and its east edge is 180.
        let tile = TileAddr::from_latlon(LatLon::new(0.0, 180.0), 32);
        assert_eq!(tile.x, u32::MAX);
        let b = tile.bounds();
        assert_abs_diff_eq!(b.max_lon, 180.0);
        assert!(b.min_lon < b.max_lon);
        assert!(b.min_lat <= b.max_lat);

        let tile = TileAddr::from_latlon(LatLon::new(-90.0, 180.0), 40);
        assert_eq!((tile.x, tile.y), (u32::MAX, u32::MAX));
        assert!(tile.bounds().min_lat.is_finite());
    }

    #[test]
    fn zoom_beyond_i32_does_not_panic() {
        assert_eq!(tile_x(0.0, 3_000_000_000), u32::MAX);
        // 0 · ∞ is NaN here; grid_index pins it to the first column.
        assert_eq!(tile_x(-180.0, 3_000_000_000), 0);
        assert_eq!(tile_y(0.0, u32::MAX), u32::MAX);
        assert_abs_diff_eq!(tile_to_longitude(5, u32::MAX), -180.0);
        assert!(tile_path(0.0, 0.0, u32::MAX).starts_with("4294967295/"));
    }

    #[test]
    fn inverse_edges() {
        assert_abs_diff_eq!(tile_to_longitude(0, 0), -180.0);
        assert_abs_diff_eq!(tile_to_longitude(1, 0), 180.0);
        assert_abs_diff_eq!(tile_to_latitude(0, 0), MAX_MERCATOR_LAT, epsilon = 1e-9);
        assert_abs_diff_eq!(tile_to_latitude(1, 0), -MAX_MERCATOR_LAT, epsilon = 1e-9);
        assert_abs_diff_eq!(tile_to_latitude(1, 1), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn total_tiles_starts_below_min_zoom() {
        assert_eq!(total_tiles(0, 3), 4 + 16 + 64);
        assert_eq!(total_tiles(5, 6), 4);
        assert_eq!(total_tiles(4, 4), 0);
        assert_eq!(total_tiles(6, 2), 0);
    }

    #[test]
    fn tile_path_format() {
        assert_eq!(tile_path(0.0, 0.0, 1), "1/1/1.png");
        assert_eq!(TileAddr::new(3, 4, 2).path("pbf"), "3/4/2.pbf");
        assert_eq!(TileAddr::new(3, 4, 2).to_string(), "3/4/2");
    }

    #[test]
    fn parse_tile_path() {
        assert_eq!("3/4/2".parse::<TileAddr>().unwrap(), TileAddr::new(3, 4, 2));
        assert_eq!("3/4/2.png".parse::<TileAddr>().unwrap(), TileAddr::new(3, 4, 2));
        assert_eq!(
            "3/9/2".parse::<TileAddr>(),
            Err(GeoError::TileOutOfRange { zoom: 3, x: 9, y: 2 })
        );
        assert!(matches!("3/4".parse::<TileAddr>(), Err(GeoError::InvalidTilePath(_))));
        assert!(matches!("3/4/2/1".parse::<TileAddr>(), Err(GeoError::InvalidTilePath(_))));
        assert!(matches!("a/b/c".parse::<TileAddr>(), Err(GeoError::InvalidTilePath(_))));
        assert_eq!(
            "31/0/0".parse::<TileAddr>(),
            Err(GeoError::ZoomOutOfRange { zoom: 31, max: MAX_ZOOM })
        );
    }

    #[test]
    fn checked_latlon() {
        assert!(LatLon::try_new(45.0, 200.0).is_ok());
        assert_eq!(LatLon::try_new(91.0, 0.0), Err(GeoError::InvalidLatitude(91.0)));
        assert!(matches!(LatLon::try_new(f64::NAN, 0.0), Err(GeoError::NonFinite { .. })));
    }

    #[test]
    fn parse_latlon() {
        assert_eq!("-33.92, 18.42".parse::<LatLon>().unwrap(), LatLon::new(-33.92, 18.42));
        assert!(matches!("12.0".parse::<LatLon>(), Err(GeoError::InvalidPoint(_))));
        assert!(matches!("x,1".parse::<LatLon>(), Err(GeoError::InvalidPoint(_))));
        assert_eq!("95,0".parse::<LatLon>(), Err(GeoError::InvalidLatitude(95.0)));
    }

    #[test]
    fn wrapped_longitude() {
        let ll = LatLon::new(10.0, 190.0).wrapped();
        assert_abs_diff_eq!(ll.lon, -170.0, epsilon = 1e-12);
        assert_eq!(LatLon::new(10.0, 179.0).wrapped().lon, 179.0);
    }

    #[test]
    fn parent_children() {
        let tile = TileAddr::new(4, 9, 5);
        for child in tile.children().unwrap() {
            assert_eq!(child.parent(), Some(tile));
        }
        assert_eq!(TileAddr::new(0, 0, 0).parent(), None);
        assert_eq!(TileAddr::new(MAX_ZOOM, 0, 0).children(), None);
    }

    #[test]
    fn center_is_inside() {
        let tile = TileAddr::new(7, 40, 90);
        assert!(tile.contains(tile.center()));
        assert_eq!(TileAddr::from_latlon(tile.center(), 7), tile);
    }

    #[test]
    fn latlon_serde_shape() {
        let json = serde_json::to_string(&LatLon::new(1.5, -2.0)).unwrap();
        assert_eq!(json, r#"{"lat":1.5,"lon":-2.0}"#);
    }

    #[test]
    fn roundtrip_within_tolerance() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let lat = rng.gen_range(-85.0..85.0);
            let lon = rng.gen_range(-180.0..180.0);

            let ll = LatLon::new(lat, lon);
            let tile = TileAddr::from_latlon(ll, 10);
            let b = tile.bounds();

            // The original point should be within the tile's bounds.
            assert!(lat >= b.min_lat - 0.0001 && lat <= b.max_lat + 0.0001);
            assert!(lon >= b.min_lon - 0.0001 && lon <= b.max_lon + 0.0001);
        }
    }
}
