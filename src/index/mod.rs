//! Street index construction and rendering.
//!
//! An [`IndexBuilder`] collects the named streets crossing the rendered
//! area, grouped by initial letter with their grid square ranges. The
//! [`StreetIndexRenderer`] draws the result onto a canvas or serializes it
//! as CSV for the tabular output format.

mod postgres;
mod renderer;

pub use postgres::PgIndexBuilder;
pub use renderer::StreetIndexRenderer;

use crate::coords::BoundingBox;
use crate::error::Result;
use crate::i18n::Locale;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub label: String,
    /// First-last grid square range, "A1-B3" style, or a single square.
    pub squares: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexCategory {
    pub name: String,
    pub entries: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreetIndex {
    pub categories: Vec<IndexCategory>,
}

impl StreetIndex {
    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.entries.is_empty())
    }

    pub fn entry_count(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }
}

/// Everything an index builder needs for one map.
#[derive(Debug, Clone)]
pub struct IndexQuery {
    pub bounding_box: BoundingBox,
    pub area_id: Option<i64>,
    pub language: Locale,
    /// Grid squares as `(label, WKT polygon)` pairs.
    pub squares: Vec<(String, String)>,
    pub boundary_wkt: Option<String>,
}

#[async_trait]
pub trait IndexBuilder: Send + Sync {
    async fn build(&self, query: &IndexQuery) -> Result<StreetIndex>;
}
