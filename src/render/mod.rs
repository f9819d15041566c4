//! Page layout renderers.
//!
//! A [`LayoutRenderer`] turns one rendering configuration into a composed
//! page: base map canvas, optional administrative shade, reference grid and
//! decorations. The [`LayoutRegistry`] maps layout names to factories so
//! callers can pick a layout at run time or register their own.

pub mod grid;
mod paper;
mod plain;

pub use grid::Grid;
pub use paper::{paper_size_by_name, paper_sizes, PaperSize};
pub use plain::PlainLayout;

use crate::coords::BoundingBox;
use crate::error::{RenderError, Result};
use crate::index::StreetIndexRenderer;
use crate::pipeline::RenderingConfiguration;
use crate::surface::Surface;
use std::path::Path;
use std::sync::Arc;

/// Everything a layout factory needs to set up one rendering job. The
/// bounding box is the resolved request box, present even when the
/// configuration only carried an area id.
pub struct LayoutJob<'a> {
    pub config: &'a RenderingConfiguration,
    pub bounding_box: BoundingBox,
    pub workspace: &'a Path,
}

/// One output file being produced from a composed page.
pub struct RenderingSession<'a> {
    pub surface: &'a mut Surface,
    pub index: &'a StreetIndexRenderer,
}

/// A trait defining the API for a page layout.
/// The pipeline uses this trait to compose the page once and replay it onto
/// each requested output surface.
pub trait LayoutRenderer: Send {
    fn paper_width_pt(&self) -> f64;

    fn paper_height_pt(&self) -> f64;

    /// The bounding box really covered by the map viewport after fitting the
    /// requested box to the viewport's aspect ratio.
    fn actual_bounding_box(&self) -> BoundingBox;

    /// The reference grid laid over the actual bounding box.
    fn grid(&self) -> &Grid;

    /// Paints the base map canvas.
    fn create_canvas(&mut self) -> Result<()>;

    /// Overlays the administrative shade region, given as a WKT multipolygon
    /// in geodetic coordinates.
    fn render_shade(&mut self, shade_wkt: &str) -> Result<()>;

    /// Finishes compositing the page, adding the grid and decorations.
    fn compose(&mut self) -> Result<()>;

    /// Replays the composed page into the session's surface.
    fn render(&self, session: &mut RenderingSession<'_>) -> Result<()>;
}

impl std::fmt::Debug for dyn LayoutRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutRenderer").finish_non_exhaustive()
    }
}

pub type LayoutFactory =
    Arc<dyn Fn(&LayoutJob<'_>) -> Result<Box<dyn LayoutRenderer>> + Send + Sync>;

struct LayoutDescriptor {
    name: String,
    description: String,
    factory: LayoutFactory,
}

/// Maps layout names to renderer factories. Lookup is first-match-wins.
pub struct LayoutRegistry {
    layouts: Vec<LayoutDescriptor>,
}

impl LayoutRegistry {
    /// An empty registry without any layout.
    pub fn new() -> LayoutRegistry {
        LayoutRegistry {
            layouts: Vec::new(),
        }
    }

    /// A registry with the bundled layouts.
    pub fn with_builtin_layouts() -> LayoutRegistry {
        let mut registry = LayoutRegistry::new();
        registry.register(
            "plain",
            "full-page map with title, grid and street index",
            Arc::new(|job| Ok(Box::new(PlainLayout::new(job)?) as Box<dyn LayoutRenderer>)),
        );
        registry
    }

    pub fn register(&mut self, name: &str, description: &str, factory: LayoutFactory) {
        self.layouts.push(LayoutDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            factory,
        });
    }

    /// Lists the registered layouts as `(name, description)` pairs.
    pub fn layouts(&self) -> Vec<(&str, &str)> {
        self.layouts
            .iter()
            .map(|l| (l.name.as_str(), l.description.as_str()))
            .collect()
    }

    pub fn create(&self, name: &str, job: &LayoutJob<'_>) -> Result<Box<dyn LayoutRenderer>> {
        let descriptor = self
            .layouts
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| RenderError::NotFound(format!("layout '{name}' is not registered")))?;
        (descriptor.factory)(job)
    }
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        LayoutRegistry::with_builtin_layouts()
    }
}
