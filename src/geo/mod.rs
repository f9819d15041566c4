//! Resolution of administrative areas into bounding boxes and boundary
//! polygons, plus the shade mask derived from them.

mod postgres;

pub use postgres::PgGeoProvider;

use crate::coords::BoundingBox;
use crate::error::Result;
use async_trait::async_trait;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fraction of the bounding box span added on each side of the shade mask,
/// so the mask bleeds past the map frame.
const SHADE_EXPAND_FRAC: f64 = 0.05;

/// The envelope and administrative boundary of one area, as WKT in the
/// rendering projection.
#[derive(Debug, Clone, PartialEq)]
pub struct GeographicInfo {
    pub area_id: i64,
    pub envelope_wkt: String,
    /// `None` when the area rows do not assemble into a polygon.
    pub boundary_wkt: Option<String>,
}

/// Source of geographic area information.
///
/// The production implementation queries the spatial database; tests inject
/// in-memory substitutes.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Resolves every given area id in one batched lookup. Ids without a
    /// matching row are simply absent from the result.
    async fn geographic_info(&self, area_ids: &[i64]) -> Result<Vec<GeographicInfo>>;
}

static SINGLE_RING_POLYGON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^POLYGON\(\(([^)]*)\)\)$").unwrap());

/// Builds the shade mask for a map: the bounding box, slightly expanded, with
/// the administrative boundary punched out as a hole.
///
/// Only single-ring polygons are supported. Anything else is logged and
/// skipped without failing the render.
pub fn compute_shade(bounding_box: &BoundingBox, boundary_wkt: &str) -> Option<String> {
    let captures = match SINGLE_RING_POLYGON.captures(boundary_wkt.trim()) {
        Some(captures) => captures,
        None => {
            warn!("Administrative boundary looks invalid, not rendering the shade.");
            return None;
        }
    };
    let inner_ring = captures.get(1).map(|m| m.as_str())?;

    let expanded = bounding_box.expand(SHADE_EXPAND_FRAC, SHADE_EXPAND_FRAC);
    Some(format!(
        "MULTIPOLYGON((({})),(({})))",
        expanded.wkt_ring(),
        inner_ring
    ))
}
