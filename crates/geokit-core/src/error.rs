use thiserror::Error;

/// Validation failures at the construction and parse boundary.
/// Geometry itself never fails: an unreachable offset origin is `None`, not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),

    #[error("coordinate ({lat}, {lon}) is not finite")]
    NonFinite { lat: f64, lon: f64 },

    #[error("invalid point {0:?}, expected lat,lon")]
    InvalidPoint(String),

    #[error("zoom {zoom} exceeds the maximum of {max}")]
    ZoomOutOfRange { zoom: u32, max: u32 },

    #[error("tile {x}/{y} does not exist at zoom {zoom}")]
    TileOutOfRange { zoom: u32, x: u32, y: u32 },

    #[error("invalid tile path {0:?}, expected z/x/y")]
    InvalidTilePath(String),
}

pub type GeoResult<T> = Result<T, GeoError>;
