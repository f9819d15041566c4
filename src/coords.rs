use crate::error::{RenderError, Result};

/// A geodetic bounding box in WGS84-style decimal degrees.
///
/// The box is always kept normalized: `min_lat <= max_lat` and
/// `min_lon <= max_lon`, with latitudes clamped to [-90, 90] and
/// longitudes to [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl BoundingBox {
    /// Builds a bounding box from two opposite corners, given in any order.
    pub fn new(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Self {
        BoundingBox {
            min_lat: lat1.min(lat2).clamp(-90.0, 90.0),
            max_lat: lat1.max(lat2).clamp(-90.0, 90.0),
            min_lon: lon1.min(lon2).clamp(-180.0, 180.0),
            max_lon: lon1.max(lon2).clamp(-180.0, 180.0),
        }
    }

    /// Parses the WKT text of a polygon envelope, keeping the extreme
    /// coordinates of its ring. Coordinates are expected as `lon lat` pairs.
    pub fn parse_wkt(wkt: &str) -> Result<Self> {
        let inner = wkt
            .trim()
            .strip_prefix("POLYGON((")
            .and_then(|s| s.strip_suffix("))"))
            .ok_or_else(|| {
                RenderError::DataIntegrity(format!("envelope is not a polygon: {wkt}"))
            })?;

        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        let mut min_lon = f64::INFINITY;
        let mut max_lon = f64::NEG_INFINITY;

        for pair in inner.split(',') {
            let mut coords = pair.split_whitespace();
            let (lon, lat) = match (coords.next(), coords.next()) {
                (Some(lon), Some(lat)) => {
                    let lon: f64 = lon.parse().map_err(|_| {
                        RenderError::DataIntegrity(format!("bad longitude in envelope: {pair}"))
                    })?;
                    let lat: f64 = lat.parse().map_err(|_| {
                        RenderError::DataIntegrity(format!("bad latitude in envelope: {pair}"))
                    })?;
                    (lon, lat)
                }
                _ => {
                    return Err(RenderError::DataIntegrity(format!(
                        "incomplete coordinate pair in envelope: {pair}"
                    )));
                }
            };
            min_lat = min_lat.min(lat);
            max_lat = max_lat.max(lat);
            min_lon = min_lon.min(lon);
            max_lon = max_lon.max(lon);
        }

        if !min_lat.is_finite() || !min_lon.is_finite() {
            return Err(RenderError::DataIntegrity(format!(
                "empty polygon envelope: {wkt}"
            )));
        }

        Ok(BoundingBox::new(min_lat, min_lon, max_lat, max_lon))
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Returns a copy of this box grown on each side by the given fraction of
    /// that axis' span. The result is clamped to the geodetic domain, so the
    /// box stays normalized even at the poles or the antimeridian.
    pub fn expand(&self, frac_lat: f64, frac_lon: f64) -> Self {
        let delta_lat = frac_lat * self.lat_span();
        let delta_lon = frac_lon * self.lon_span();
        BoundingBox::new(
            self.min_lat - delta_lat,
            self.min_lon - delta_lon,
            self.max_lat + delta_lat,
            self.max_lon + delta_lon,
        )
    }

    /// The ring of this box as bare WKT coordinates, closed on the starting
    /// corner. Pairs are `lon lat`, starting at the north-west corner and
    /// walking counter-clockwise.
    pub fn wkt_ring(&self) -> String {
        format!(
            "{:.6} {:.6}, {:.6} {:.6}, {:.6} {:.6}, {:.6} {:.6}, {:.6} {:.6}",
            self.min_lon,
            self.max_lat,
            self.min_lon,
            self.min_lat,
            self.max_lon,
            self.min_lat,
            self.max_lon,
            self.max_lat,
            self.min_lon,
            self.max_lat,
        )
    }

    /// The full WKT polygon statement for this box.
    pub fn as_wkt(&self) -> String {
        format!("POLYGON(({}))", self.wkt_ring())
    }
}
