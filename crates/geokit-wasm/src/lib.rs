//! Browser bindings for geokit-core.
//! Points cross the boundary as `{lat, lon}` objects; paths as arrays of
//! points or as a JSON string of the same shape.

use geokit_core::coords::{self, TileAddr};
use geokit_core::{sphere, GeoError, LatLon};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn point(value: JsValue) -> Result<LatLon, JsValue> {
    let ll: LatLon = serde_wasm_bindgen::from_value(value)?;
    LatLon::try_new(ll.lat, ll.lon).map_err(js_err)
}

fn path(value: JsValue) -> Result<Vec<LatLon>, JsValue> {
    match value.as_string() {
        Some(text) => parse_path_json(&text).map_err(JsValue::from),
        None => {
            let points: Vec<LatLon> = serde_wasm_bindgen::from_value(value)?;
            check_points(points).map_err(JsValue::from)
        }
    }
}

fn parse_path_json(text: &str) -> Result<Vec<LatLon>, String> {
    let points: Vec<LatLon> = serde_json::from_str(text).map_err(|e| format!("Invalid path: {e}"))?;
    check_points(points)
}

fn check_points(points: Vec<LatLon>) -> Result<Vec<LatLon>, String> {
    for p in &points {
        LatLon::try_new(p.lat, p.lon).map_err(|e| e.to_string())?;
    }
    Ok(points)
}

fn check_zoom(zoom: u32) -> Result<u32, GeoError> {
    if zoom > coords::MAX_ZOOM {
        return Err(GeoError::ZoomOutOfRange { zoom, max: coords::MAX_ZOOM });
    }
    Ok(zoom)
}

/// Tile `{zoom, x, y}` containing the coordinate.
#[wasm_bindgen]
pub fn tile_for(lat: f64, lon: f64, zoom: u32) -> Result<JsValue, JsValue> {
    let zoom = check_zoom(zoom).map_err(js_err)?;
    let ll = LatLon::try_new(lat, lon).map_err(js_err)?;
    to_js(&TileAddr::from_latlon(ll, zoom))
}

/// `z/x/y.png` path of the tile containing the coordinate.
#[wasm_bindgen]
pub fn tile_path(lat: f64, lon: f64, zoom: u32) -> Result<String, JsValue> {
    let zoom = check_zoom(zoom).map_err(js_err)?;
    Ok(coords::tile_path(lat, lon, zoom))
}

/// Bounds `{min_lat, min_lon, max_lat, max_lon}` of a `z/x/y` tile.
#[wasm_bindgen]
pub fn tile_bounds(tile: &str) -> Result<JsValue, JsValue> {
    let tile: TileAddr = tile.parse().map_err(js_err)?;
    to_js(&tile.bounds())
}

#[wasm_bindgen]
pub fn total_tiles(min_zoom: u32, max_zoom: u32) -> f64 {
    // JS numbers are f64; the count stays exact up to 2^53.
    coords::total_tiles(min_zoom, max_zoom) as f64
}

#[wasm_bindgen]
pub fn heading(from: JsValue, to: JsValue) -> Result<f64, JsValue> {
    Ok(sphere::compute_heading(point(from)?, point(to)?))
}

/// Great-circle distance in metres.
#[wasm_bindgen]
pub fn distance(from: JsValue, to: JsValue) -> Result<f64, JsValue> {
    Ok(sphere::compute_distance_between(point(from)?, point(to)?))
}

/// Destination point; the longitude is not wrapped.
#[wasm_bindgen]
pub fn offset(from: JsValue, distance: f64, heading: f64) -> Result<JsValue, JsValue> {
    to_js(&sphere::compute_offset(point(from)?, distance, heading))
}

/// Origin point, or `undefined` when no origin reaches `to`.
#[wasm_bindgen]
pub fn offset_origin(to: JsValue, distance: f64, heading: f64) -> Result<JsValue, JsValue> {
    match sphere::compute_offset_origin(point(to)?, distance, heading) {
        Some(origin) => to_js(&origin),
        None => Ok(JsValue::UNDEFINED),
    }
}

#[wasm_bindgen]
pub fn interpolate(from: JsValue, to: JsValue, fraction: f64) -> Result<JsValue, JsValue> {
    to_js(&sphere::interpolate(point(from)?, point(to)?, fraction))
}

/// Length of an open path in metres.
#[wasm_bindgen]
pub fn path_length(points: JsValue) -> Result<f64, JsValue> {
    Ok(sphere::compute_length(&path(points)?))
}

/// Area of a closed path in square metres; `signed` keeps the winding sign.
#[wasm_bindgen]
pub fn path_area(points: JsValue, signed: bool) -> Result<f64, JsValue> {
    let points = path(points)?;
    Ok(if signed { sphere::compute_signed_area(&points) } else { sphere::compute_area(&points) })
}
