use async_trait::async_trait;
use papermap::geo::{GeoProvider, GeographicInfo};
use papermap::index::{IndexBuilder, IndexCategory, IndexEntry, IndexQuery, StreetIndex};
use papermap::Atlas;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub const CHEVREUSE_OSMID: i64 = -943886;

pub const SAMPLE_CONFIG: &str = r#"
[datasource]
dbname = "gis"
host = "localhost"
user = "maposmatic"
password = "secret"

[rendering]
available_stylesheets = "default"

[default]
name = "default"
path = "/usr/share/styles/default.xml"
description = "Default map stylesheet"
"#;

pub fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("papermap.toml");
    std::fs::write(&path, SAMPLE_CONFIG).unwrap();
    path
}

/// Serves canned geographic records instead of querying a database.
pub struct FixedGeoProvider {
    pub records: Vec<GeographicInfo>,
}

#[async_trait]
impl GeoProvider for FixedGeoProvider {
    async fn geographic_info(&self, area_ids: &[i64]) -> papermap::Result<Vec<GeographicInfo>> {
        Ok(self
            .records
            .iter()
            .filter(|r| area_ids.contains(&r.area_id))
            .cloned()
            .collect())
    }
}

/// Returns a small fixed street index and records every query it was asked.
pub struct FixedIndexBuilder {
    pub queries: Mutex<Vec<IndexQuery>>,
}

impl FixedIndexBuilder {
    pub fn new() -> Arc<FixedIndexBuilder> {
        Arc::new(FixedIndexBuilder {
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl IndexBuilder for FixedIndexBuilder {
    async fn build(&self, query: &IndexQuery) -> papermap::Result<StreetIndex> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(sample_index())
    }
}

pub fn sample_index() -> StreetIndex {
    StreetIndex {
        categories: vec![
            IndexCategory {
                name: "A".to_string(),
                entries: vec![IndexEntry {
                    label: "avenue de la Division Leclerc".to_string(),
                    squares: "A2-B3".to_string(),
                }],
            },
            IndexCategory {
                name: "R".to_string(),
                entries: vec![
                    IndexEntry {
                        label: "rue de Rivoli".to_string(),
                        squares: "C1".to_string(),
                    },
                    IndexEntry {
                        label: "rue du Bac".to_string(),
                        squares: "A1-A2".to_string(),
                    },
                ],
            },
        ],
    }
}

/// An atlas reading the sample configuration, with both database-backed
/// collaborators replaced by the given substitutes.
pub fn test_atlas(
    config_dir: &Path,
    geo: Arc<dyn GeoProvider>,
    index: Arc<dyn IndexBuilder>,
) -> Atlas {
    let config_path = write_config(config_dir);
    Atlas::builder()
        .with_config_file(&config_path)
        .with_geo_provider(geo)
        .with_index_builder(index)
        .build()
        .unwrap()
}
