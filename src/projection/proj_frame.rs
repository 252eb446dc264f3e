// src/projection/proj_frame.rs

use proj::Proj;

use super::{check_geographic, MetricProjection};
use crate::error::{ConfigurationError, DedupError, DedupResult};

const GEOGRAPHIC_CRS: &str = "EPSG:4326";

/// Metric frame backed by a pair of PROJ transforms.
pub struct ProjFrame {
    crs: String,
    to_metric: Proj,
    to_geographic: Proj,
}

impl ProjFrame {
    /// `crs` is the identifier as configured; `definition` is what PROJ is given.
    pub fn new(crs: &str, definition: &str) -> DedupResult<Self> {
        let to_metric = Proj::new_known_crs(GEOGRAPHIC_CRS, definition, None)
            .map_err(|_| ConfigurationError::UnresolvableCrs(crs.to_string()))?;
        let to_geographic = Proj::new_known_crs(definition, GEOGRAPHIC_CRS, None)
            .map_err(|_| ConfigurationError::UnresolvableCrs(crs.to_string()))?;
        Ok(Self {
            crs: crs.to_string(),
            to_metric,
            to_geographic,
        })
    }
}

impl MetricProjection for ProjFrame {
    fn crs(&self) -> &str {
        &self.crs
    }

    fn forward(&self, lon: f64, lat: f64) -> DedupResult<(f64, f64)> {
        check_geographic(lon, lat)?;
        let (x, y) = self
            .to_metric
            .convert((lon, lat))
            .map_err(|e| DedupError::Projection(format!("{}: {}", self.crs, e)))?;
        if !x.is_finite() || !y.is_finite() {
            return Err(DedupError::InvalidCoordinate { lon, lat });
        }
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> DedupResult<(f64, f64)> {
        let (lon, lat) = self
            .to_geographic
            .convert((x, y))
            .map_err(|e| DedupError::Projection(format!("{}: {}", self.crs, e)))?;
        if !lon.is_finite() || !lat.is_finite() {
            return Err(DedupError::Projection(format!(
                "{}: ({}, {}) has no geographic inverse",
                self.crs, x, y
            )));
        }
        Ok((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utm32n() -> ProjFrame {
        ProjFrame::new("EPSG:32632", "EPSG:32632").unwrap()
    }

    #[test]
    fn test_central_meridian_maps_to_false_easting() {
        let (x, y) = utm32n().forward(9.0, 0.0).unwrap();
        assert!((x - 500_000.0).abs() < 1e-3, "easting {}", x);
        assert!(y.abs() < 1e-3, "northing {}", y);
    }

    #[test]
    fn test_known_reference_point() {
        // Statue of Liberty, UTM 18N
        let frame = ProjFrame::new("EPSG:32618", "EPSG:32618").unwrap();
        let (x, y) = frame.forward(-74.0445, 40.6892).unwrap();
        assert!((x - 580_735.87).abs() < 0.05, "easting {}", x);
        assert!((y - 4_504_695.17).abs() < 0.05, "northing {}", y);
    }

    #[test]
    fn test_round_trip_is_sub_millimetre() {
        let frame = utm32n();
        for &(lon, lat) in &[(9.1919, 45.4641), (7.6869, 45.0703), (11.2558, 43.7696)] {
            let (x, y) = frame.forward(lon, lat).unwrap();
            let (lon2, lat2) = frame.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-7, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-7, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_metric_distances_are_ground_distances() {
        let frame = utm32n();
        // 0.001 degree of latitude is about 111 m at 45N
        let a = frame.forward(9.19, 45.46).unwrap();
        let b = frame.forward(9.19, 45.461).unwrap();
        let d = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
        assert!((d - 111.1).abs() < 0.5, "distance {}", d);
    }

    #[test]
    fn test_unknown_definition_is_unresolvable() {
        assert!(matches!(
            ProjFrame::new("bogus", "EPSG:99999"),
            Err(DedupError::Configuration(ConfigurationError::UnresolvableCrs(_)))
        ));
    }
}
