use super::{GeoProvider, GeographicInfo};
use crate::db::Datasource;
use crate::error::{RenderError, Result};
use async_trait::async_trait;
use log::debug;
use sqlx::Row;
use std::sync::Arc;

/// Spatial-database implementation of [`GeoProvider`], reading the imported
/// OpenStreetMap polygon table.
pub struct PgGeoProvider {
    datasource: Arc<Datasource>,
}

impl PgGeoProvider {
    pub fn new(datasource: Arc<Datasource>) -> Self {
        PgGeoProvider { datasource }
    }
}

const GEOGRAPHIC_INFO_QUERY: &str = r#"
SELECT osm_id,
       ST_AsText(ST_Transform(ST_Envelope(way), 4002)) AS envelope,
       ST_AsText(ST_Transform(ST_BuildArea(way), 4002)) AS boundary
FROM planet_osm_polygon
WHERE osm_id = ANY($1)
"#;

#[async_trait]
impl GeoProvider for PgGeoProvider {
    async fn geographic_info(&self, area_ids: &[i64]) -> Result<Vec<GeographicInfo>> {
        debug!(
            "Looking up bounding box and contour of area ids {:?}...",
            area_ids
        );

        let pool = self.datasource.pool().await?;
        let rows = sqlx::query(GEOGRAPHIC_INFO_QUERY)
            .bind(area_ids.to_vec())
            .fetch_all(pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let area_id: i64 = row
                    .try_get("osm_id")
                    .map_err(|e| RenderError::DataIntegrity(format!("bad osm_id column: {e}")))?;
                let envelope: String = row
                    .try_get("envelope")
                    .map_err(|e| RenderError::DataIntegrity(format!("bad envelope column: {e}")))?;
                let boundary: Option<String> = row
                    .try_get("boundary")
                    .map_err(|e| RenderError::DataIntegrity(format!("bad boundary column: {e}")))?;

                Ok(GeographicInfo {
                    area_id,
                    envelope_wkt: envelope.trim().to_string(),
                    boundary_wkt: boundary.map(|b| b.trim().to_string()),
                })
            })
            .collect()
    }
}
