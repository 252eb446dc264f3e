// src/projection/mod.rs
//! Metric-frame reprojection for proximity clustering.
//!
//! Points arrive as geographic lon/lat (EPSG:4326). Clustering radii are in
//! meters, so every point is moved into a planar frame chosen per region
//! (a UTM zone for a city, typically) and the representative centroid is
//! moved back afterwards.

mod proj_frame;

use log::debug;

use crate::error::{ConfigurationError, DedupError, DedupResult};

pub use proj_frame::ProjFrame;

pub const WGS84_GEOGRAPHIC: u32 = 4326;

/// Forward and inverse transform between geographic lon/lat and a planar frame in meters.
///
/// Only `Send`: PROJ contexts must not be shared across threads, so callers
/// project on one thread and fan out afterwards.
pub trait MetricProjection: Send {
    /// Identifier the projection was resolved from, for logging.
    fn crs(&self) -> &str;

    /// Geographic (lon, lat) in degrees to planar (x, y) in meters.
    fn forward(&self, lon: f64, lat: f64) -> DedupResult<(f64, f64)>;

    /// Planar (x, y) in meters back to geographic (lon, lat) in degrees.
    fn inverse(&self, x: f64, y: f64) -> DedupResult<(f64, f64)>;
}

/// Parses `EPSG:32632`, `epsg:32632` or `32632`.
pub fn parse_epsg_code(crs: &str) -> Option<u32> {
    let trimmed = crs.trim();
    let code = match trimmed.split_once(':') {
        Some((authority, code)) if authority.eq_ignore_ascii_case("epsg") => code,
        Some(_) => return None,
        None => trimmed,
    };
    code.trim().parse::<u32>().ok()
}

/// Resolves a coordinate reference identifier to a metric projection.
///
/// Bare EPSG codes are qualified as `EPSG:<code>`; anything else is handed to
/// PROJ as written. The geographic frame the points arrive in is refused.
pub fn resolve_metric_frame(crs: &str) -> DedupResult<Box<dyn MetricProjection>> {
    let trimmed = crs.trim();
    if trimmed.is_empty() {
        return Err(ConfigurationError::UnresolvableCrs(crs.to_string()).into());
    }
    let definition = match parse_epsg_code(trimmed) {
        Some(WGS84_GEOGRAPHIC) => {
            return Err(ConfigurationError::NotMetric(crs.to_string()).into());
        }
        Some(code) => format!("EPSG:{}", code),
        None => trimmed.to_string(),
    };

    debug!("Resolving metric frame {} through PROJ", definition);
    let frame = ProjFrame::new(crs, &definition)?;
    Ok(Box::new(frame))
}

/// Rejects coordinates no projection can handle.
pub(crate) fn check_geographic(lon: f64, lat: f64) -> DedupResult<()> {
    if !lon.is_finite() || !lat.is_finite() || lat.abs() > 90.0 {
        return Err(DedupError::InvalidCoordinate { lon, lat });
    }
    Ok(())
}
