//! Slippy-map tile addressing and spherical-earth geometry.
//! Every function is a pure function of its arguments; nothing here holds state.

pub mod coords;
pub mod error;
pub mod math;
pub mod sphere;

pub use coords::{LatLon, TileAddr, TileBounds};
pub use error::{GeoError, GeoResult};
pub use math::EARTH_RADIUS;
