//! Command-line front end for geokit-core: tile lookup and spherical
//! geometry. Each invocation prints one JSON document on stdout.
//!
//! Points are given as `lat,lon` in degrees; paths as a JSON array of
//! `{"lat": .., "lon": ..}` objects, read from a file or `-` for stdin.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use geokit_core::coords::{self, TileAddr, TileBounds, MAX_ZOOM};
use geokit_core::{sphere, GeoError, LatLon};
use log::{debug, LevelFilter};
use serde::Serialize;
use serde_json::{json, Value};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "geokit", about = "Slippy-map tiles and spherical-earth geometry")]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Indent the JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tile containing a coordinate, with its path and bounds.
    Tile {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(short, long)]
        zoom: u32,
    },
    /// Bounds and center of a tile given as z/x/y (an extension is ignored).
    Bounds { tile: TileAddr },
    /// Tiles below MIN_ZOOM down to and including MAX_ZOOM.
    TotalTiles {
        #[arg(long, default_value_t = 0)]
        min_zoom: u32,
        #[arg(long)]
        max_zoom: u32,
    },
    /// Initial bearing in degrees, [-180, 180).
    Heading {
        #[arg(long, allow_hyphen_values = true)]
        from: LatLon,
        #[arg(long, allow_hyphen_values = true)]
        to: LatLon,
    },
    /// Great-circle distance.
    Distance {
        #[arg(long, allow_hyphen_values = true)]
        from: LatLon,
        #[arg(long, allow_hyphen_values = true)]
        to: LatLon,
    },
    /// Destination after travelling DISTANCE metres on HEADING.
    Offset {
        #[arg(long, allow_hyphen_values = true)]
        from: LatLon,
        #[arg(long)]
        distance: f64,
        #[arg(long, allow_hyphen_values = true)]
        heading: f64,
        /// Wrap the resulting longitude into [-180, 180).
        #[arg(long)]
        wrap: bool,
    },
    /// Origin that reaches TO after DISTANCE metres on HEADING; null if none exists.
    OffsetOrigin {
        #[arg(long, allow_hyphen_values = true)]
        to: LatLon,
        #[arg(long)]
        distance: f64,
        #[arg(long, allow_hyphen_values = true)]
        heading: f64,
    },
    /// Point FRACTION of the way along the great circle.
    Interpolate {
        #[arg(long, allow_hyphen_values = true)]
        from: LatLon,
        #[arg(long, allow_hyphen_values = true)]
        to: LatLon,
        #[arg(long, allow_hyphen_values = true)]
        fraction: f64,
    },
    /// Length of an open path in metres.
    Length { path: PathBuf },
    /// Area of a closed path in square metres.
    Area {
        path: PathBuf,
        /// Keep the sign (positive for counter-clockwise rings).
        #[arg(long)]
        signed: bool,
    },
}

// ── Output ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TileReport {
    tile: TileAddr,
    path: String,
    bounds: TileBounds,
    center: LatLon,
}

impl TileReport {
    fn new(tile: TileAddr) -> Self {
        Self { tile, path: tile.path("png"), bounds: tile.bounds(), center: tile.center() }
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

fn run(command: Command) -> Result<Value> {
    let value = match command {
        Command::Tile { lat, lon, zoom } => {
            ensure!(zoom <= MAX_ZOOM, GeoError::ZoomOutOfRange { zoom, max: MAX_ZOOM });
            let point = LatLon::try_new(lat, lon)?;
            serde_json::to_value(TileReport::new(TileAddr::from_latlon(point, zoom)))?
        }
        Command::Bounds { tile } => serde_json::to_value(TileReport::new(tile))?,
        Command::TotalTiles { min_zoom, max_zoom } => json!({
            "min_zoom": min_zoom,
            "max_zoom": max_zoom,
            "total": coords::total_tiles(min_zoom, max_zoom),
        }),
        Command::Heading { from, to } => json!({ "heading": sphere::compute_heading(from, to) }),
        Command::Distance { from, to } => json!({
            "meters": sphere::compute_distance_between(from, to),
            "radians": sphere::compute_angle_between(from, to),
        }),
        Command::Offset { from, distance, heading, wrap } => {
            let to = sphere::compute_offset(from, distance, heading);
            serde_json::to_value(if wrap { to.wrapped() } else { to })?
        }
        Command::OffsetOrigin { to, distance, heading } => {
            let origin = sphere::compute_offset_origin(to, distance, heading);
            if origin.is_none() {
                debug!("no origin reaches {to} after {distance} m on heading {heading}");
            }
            serde_json::to_value(origin)?
        }
        Command::Interpolate { from, to, fraction } => serde_json::to_value(sphere::interpolate(from, to, fraction))?,
        Command::Length { path } => json!({ "meters": sphere::compute_length(&read_path(&path)?) }),
        Command::Area { path, signed } => {
            let points = read_path(&path)?;
            let area = if signed { sphere::compute_signed_area(&points) } else { sphere::compute_area(&points) };
            json!({ "square_meters": area })
        }
    };
    Ok(value)
}

fn read_path(src: &Path) -> Result<Vec<LatLon>> {
    let text = if src == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("Failed to read path from stdin")?;
        buf
    } else {
        fs::read_to_string(src).with_context(|| format!("Failed to read {}", src.display()))?
    };
    parse_path(&text).with_context(|| format!("Invalid path in {}", src.display()))
}

/// Parse a JSON point array, rejecting latitudes outside [-90, 90].
fn parse_path(text: &str) -> Result<Vec<LatLon>> {
    let points: Vec<LatLon> = serde_json::from_str(text)?;
    for p in &points {
        LatLon::try_new(p.lat, p.lon)?;
    }
    debug!("read {} path points", points.len());
    Ok(points)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    debug!("{:?}", args.command);

    let value = run(args.command)?;
    let out = if args.pretty { serde_json::to_string_pretty(&value)? } else { serde_json::to_string(&value)? };
    println!("{out}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> Result<Value> {
        let args = Args::try_parse_from(argv)?;
        run(args.command)
    }

    #[test]
    fn tile_at_zoom_one() {
        let out = run_args(&["geokit", "tile", "--lat", "0", "--lon", "0", "-z", "1"]).unwrap();
        assert_eq!(out["path"], "1/1/1.png");
        assert_eq!(out["tile"], json!({ "zoom": 1, "x": 1, "y": 1 }));
    }

    #[test]
    fn tile_rejects_bad_input() {
        assert!(run_args(&["geokit", "tile", "--lat", "95", "--lon", "0", "-z", "1"]).is_err());
        assert!(run_args(&["geokit", "tile", "--lat", "0", "--lon", "0", "-z", "40"]).is_err());
    }

    #[test]
    fn bounds_parses_tile_path() {
        let out = run_args(&["geokit", "bounds", "1/0/0.png"]).unwrap();
        assert_eq!(out["bounds"]["min_lon"], -180.0);
        assert_eq!(out["bounds"]["max_lon"], 0.0);
        assert_eq!(out["bounds"]["min_lat"], 0.0);
        assert!(Args::try_parse_from(["geokit", "bounds", "1/5/0"]).is_err());
    }

    #[test]
    fn total_tiles_command() {
        let out = run_args(&["geokit", "total-tiles", "--max-zoom", "3"]).unwrap();
        assert_eq!(out["total"], 84);
    }

    #[test]
    fn negative_coordinates_parse() {
        let out = run_args(&["geokit", "heading", "--from", "-10,0", "--to", "-20,0"]).unwrap();
        assert_eq!(out["heading"], -180.0);
    }

    #[test]
    fn offset_wraps_on_request() {
        let argv = ["geokit", "offset", "--from", "0,170", "--distance", "2223901", "--heading", "90"];
        let raw = run_args(&argv).unwrap();
        assert!(raw["lon"].as_f64().unwrap() > 180.0);

        let mut wrapped = argv.to_vec();
        wrapped.push("--wrap");
        let out = run_args(&wrapped).unwrap();
        assert!(out["lon"].as_f64().unwrap() < -169.0);
    }

    #[test]
    fn offset_origin_without_solution_is_null() {
        let out = run_args(&["geokit", "offset-origin", "--to", "80,0", "--distance", "5003778", "--heading", "90"]).unwrap();
        assert_eq!(out, Value::Null);
    }

    #[test]
    fn parse_path_checks_latitude() {
        let points = parse_path(r#"[{"lat": 1.0, "lon": 2.0}, {"lat": -3.0, "lon": 4.0}]"#).unwrap();
        assert_eq!(points, vec![LatLon::new(1.0, 2.0), LatLon::new(-3.0, 4.0)]);
        assert!(parse_path(r#"[{"lat": 100.0, "lon": 0.0}]"#).is_err());
        assert!(parse_path("not json").is_err());
    }
}
