use super::config::RenderingConfiguration;
use super::workspace::Workspace;
use crate::config::FileConfig;
use crate::coords::BoundingBox;
use crate::db::Datasource;
use crate::error::{RenderError, Result};
use crate::geo::{compute_shade, GeoProvider, PgGeoProvider};
use crate::index::{IndexBuilder, IndexQuery, PgIndexBuilder, StreetIndexRenderer};
use crate::render::{
    paper_sizes, LayoutFactory, LayoutJob, LayoutRegistry, PaperSize, RenderingSession,
};
use crate::stylesheet::{Stylesheet, StylesheetRegistry};
use crate::surface::{OutputFormat, Surface, PT_PER_INCH};
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A builder for creating an [`Atlas`].
pub struct AtlasBuilder {
    config_files: Vec<PathBuf>,
    workspace_root: Option<PathBuf>,
    grid_table_prefix: String,
    geo_provider: Option<Arc<dyn GeoProvider>>,
    index_builder: Option<Arc<dyn IndexBuilder>>,
    layouts: LayoutRegistry,
}

impl Default for AtlasBuilder {
    fn default() -> Self {
        AtlasBuilder {
            config_files: FileConfig::default_config_files(),
            workspace_root: None,
            grid_table_prefix: String::new(),
            geo_provider: None,
            index_builder: None,
            layouts: LayoutRegistry::with_builtin_layouts(),
        }
    }
}

impl AtlasBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reads the configuration from this file only, instead of the default
    /// candidate locations.
    pub fn with_config_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.with_config_files([path])
    }

    /// Reads the configuration from the first readable file of `paths`.
    pub fn with_config_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.config_files = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();
        self
    }

    /// Roots every per-job temporary workspace under this directory.
    pub fn with_workspace_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.workspace_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Prefixes the grid square table name, keeping concurrent index builds
    /// on one database apart.
    pub fn with_grid_table_prefix(mut self, prefix: &str) -> Self {
        self.grid_table_prefix = prefix.to_string();
        self
    }

    /// Substitutes the geographic lookup implementation.
    pub fn with_geo_provider(mut self, provider: Arc<dyn GeoProvider>) -> Self {
        self.geo_provider = Some(provider);
        self
    }

    /// Substitutes the street index implementation.
    pub fn with_index_builder(mut self, builder: Arc<dyn IndexBuilder>) -> Self {
        self.index_builder = Some(builder);
        self
    }

    /// Registers an additional page layout.
    pub fn register_layout(mut self, name: &str, description: &str, factory: LayoutFactory) -> Self {
        self.layouts.register(name, description, factory);
        self
    }

    /// Consumes the builder and creates the [`Atlas`].
    pub fn build(self) -> Result<Atlas> {
        let file_config = FileConfig::load(&self.config_files)?;
        let stylesheets = StylesheetRegistry::load_all(&file_config)?;
        let datasource = Arc::new(Datasource::new(file_config.datasource.clone()));

        let geo = self
            .geo_provider
            .unwrap_or_else(|| Arc::new(PgGeoProvider::new(datasource.clone())));
        let index = self.index_builder.unwrap_or_else(|| {
            Arc::new(PgIndexBuilder::new(
                datasource.clone(),
                &self.grid_table_prefix,
            ))
        });

        Ok(Atlas {
            stylesheets,
            datasource,
            geo,
            index,
            layouts: self.layouts,
            workspace_root: self.workspace_root,
            png_dpi: file_config.png_dpi(),
        })
    }
}

/// The library entry point: holds the loaded configuration and the shared
/// collaborators, and renders maps from it.
///
/// An `Atlas` is read-only after construction and can serve concurrent
/// render calls; each call works in its own temporary workspace.
pub struct Atlas {
    stylesheets: StylesheetRegistry,
    datasource: Arc<Datasource>,
    geo: Arc<dyn GeoProvider>,
    index: Arc<dyn IndexBuilder>,
    layouts: LayoutRegistry,
    workspace_root: Option<PathBuf>,
    png_dpi: u32,
}

impl std::fmt::Debug for Atlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Atlas")
            .field("stylesheets", &self.stylesheets)
            .field("datasource", &self.datasource)
            .field("workspace_root", &self.workspace_root)
            .field("png_dpi", &self.png_dpi)
            .finish_non_exhaustive()
    }
}

impl Atlas {
    pub fn builder() -> AtlasBuilder {
        AtlasBuilder::new()
    }

    /// The registered stylesheets, in configuration order.
    pub fn stylesheets(&self) -> &[Stylesheet] {
        self.stylesheets.all()
    }

    pub fn stylesheet_by_name(&self, name: &str) -> Result<&Stylesheet> {
        self.stylesheets.by_name(name)
    }

    /// The registered layouts as `(name, description)` pairs.
    pub fn layouts(&self) -> Vec<(&str, &str)> {
        self.layouts.layouts()
    }

    pub fn paper_sizes(&self) -> &'static [PaperSize] {
        paper_sizes()
    }

    pub fn datasource(&self) -> &Arc<Datasource> {
        &self.datasource
    }

    /// Renders one map to every requested format.
    ///
    /// Output files are named `<prefix>.<extension>`. The formats are
    /// processed in caller order and the first failure aborts the remaining
    /// ones. Returns the paths of the files written.
    pub async fn render(
        &self,
        config: &RenderingConfiguration,
        layout_name: &str,
        formats: &[OutputFormat],
        prefix: &Path,
    ) -> Result<Vec<PathBuf>> {
        // --- STAGE 1: Resolve the rendering area ---
        info!(
            "Rendering with layout {} in language: {} (rtl: {}).",
            layout_name,
            config.language().code(),
            config.rtl()
        );
        let (bounding_box, boundary_wkt) = self.resolve_area(config).await?;

        // --- STAGE 2: Acquire the scoped workspace ---
        let workspace = Workspace::create(self.workspace_root.as_deref())?;

        let result = self
            .render_in_workspace(
                config,
                layout_name,
                formats,
                prefix,
                bounding_box,
                boundary_wkt,
                workspace.path(),
            )
            .await;

        // --- STAGE 7: Release the workspace on every exit path ---
        workspace.close();
        result
    }

    /// Looks up the request box, from the explicit bounding box or from the
    /// database envelope of the area id.
    async fn resolve_area(
        &self,
        config: &RenderingConfiguration,
    ) -> Result<(BoundingBox, Option<String>)> {
        let Some(area_id) = config.area_id() else {
            let bounding_box = config.bounding_box().ok_or_else(|| {
                RenderError::Precondition(
                    "at least an area id or a bounding box must be provided".to_string(),
                )
            })?;
            return Ok((bounding_box, None));
        };

        let records = self.geo.geographic_info(&[area_id]).await?;
        let record = records
            .into_iter()
            .find(|r| r.area_id == area_id)
            .ok_or_else(|| {
                RenderError::NotFound(format!("area id {area_id} not found in the database"))
            })?;

        let bounding_box = match config.bounding_box() {
            Some(explicit) => explicit,
            None => BoundingBox::parse_wkt(&record.envelope_wkt)?,
        };
        Ok((bounding_box, record.boundary_wkt))
    }

    #[allow(clippy::too_many_arguments)]
    async fn render_in_workspace(
        &self,
        config: &RenderingConfiguration,
        layout_name: &str,
        formats: &[OutputFormat],
        prefix: &Path,
        bounding_box: BoundingBox,
        boundary_wkt: Option<String>,
        workspace: &Path,
    ) -> Result<Vec<PathBuf>> {
        // --- STAGE 3: Build the layout and its base canvas ---
        let job = LayoutJob {
            config,
            bounding_box,
            workspace,
        };
        let mut layout = self.layouts.create(layout_name, &job)?;
        layout.create_canvas()?;
        let actual_bbox = layout.actual_bounding_box();

        // --- STAGE 4: Shade the surroundings of the administrative area ---
        if let Some(boundary) = &boundary_wkt {
            if let Some(shade) = compute_shade(&actual_bbox, boundary) {
                layout.render_shade(&shade)?;
            }
        }

        // --- STAGE 5: Compose the page and build the street index ---
        layout.compose()?;
        let query = IndexQuery {
            bounding_box: actual_bbox,
            area_id: config.area_id(),
            language: config.language().clone(),
            squares: layout.grid().squares_wkt(),
            boundary_wkt,
        };
        let street_index = self.index.build(&query).await?;
        debug!("Indexed {} streets.", street_index.entry_count());
        let index_renderer = StreetIndexRenderer::new(street_index, config.rtl());

        // --- STAGE 6: Write every requested output file ---
        let mut written = Vec::with_capacity(formats.len());
        for format in formats {
            info!("Rendering to {} format...", format.to_string().to_uppercase());
            let path = PathBuf::from(format!("{}.{}", prefix.display(), format.extension()));

            if *format == OutputFormat::Csv {
                let file = File::create(&path)?;
                index_renderer.write_csv(BufWriter::new(file))?;
                written.push(path);
                continue;
            }

            let dpi = if *format == OutputFormat::Png {
                f64::from(self.png_dpi)
            } else {
                PT_PER_INCH
            };
            let Some(mut surface) = Surface::create(
                *format,
                layout.paper_width_pt(),
                layout.paper_height_pt(),
                dpi,
                &path,
            )?
            else {
                continue;
            };
            let mut session = RenderingSession {
                surface: &mut surface,
                index: &index_renderer,
            };
            layout.render(&mut session)?;
            surface.finish()?;
            written.push(path);
        }
        Ok(written)
    }
}
