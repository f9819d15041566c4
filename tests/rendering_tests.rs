mod common;

use common::{
    test_atlas, write_config, FixedGeoProvider, FixedIndexBuilder, TestResult, CHEVREUSE_OSMID,
};
use papermap::coords::BoundingBox;
use papermap::geo::GeographicInfo;
use papermap::render::{Grid, LayoutRenderer, PlainLayout, RenderingSession};
use papermap::{Atlas, Locale, OutputFormat, RenderError, RenderingConfiguration};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const ENVELOPE_WKT: &str = "POLYGON((2.010000 48.700000, 2.010000 48.720000, \
                            2.060000 48.720000, 2.060000 48.700000, 2.010000 48.700000))";
const BOUNDARY_WKT: &str = "POLYGON((2.020000 48.705000, 2.020000 48.715000, \
                            2.050000 48.715000, 2.050000 48.705000, 2.020000 48.705000))";

fn chevreuse_record() -> GeographicInfo {
    GeographicInfo {
        area_id: CHEVREUSE_OSMID,
        envelope_wkt: ENVELOPE_WKT.to_string(),
        boundary_wkt: Some(BOUNDARY_WKT.to_string()),
    }
}

fn chevreuse_config(atlas: &Atlas) -> RenderingConfiguration {
    let stylesheet = atlas.stylesheet_by_name("default").unwrap().clone();
    RenderingConfiguration::new(
        "Chevreuse",
        Locale::parse("fr_FR.UTF-8"),
        stylesheet,
        210.0,
        297.0,
    )
}

#[tokio::test]
async fn test_area_id_render_derives_the_box_and_shades_the_boundary() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir()?;
    let workspace_root = tempfile::tempdir()?;
    let geo = Arc::new(FixedGeoProvider {
        records: vec![chevreuse_record()],
    });
    let index = FixedIndexBuilder::new();

    let config_path = write_config(dir.path());
    let atlas = Atlas::builder()
        .with_config_file(&config_path)
        .with_geo_provider(geo)
        .with_index_builder(index.clone())
        .with_workspace_root(workspace_root.path())
        .build()?;

    let config = chevreuse_config(&atlas).with_area_id(CHEVREUSE_OSMID);
    let formats = [OutputFormat::Svg, OutputFormat::Pdf, OutputFormat::Csv];
    let prefix = dir.path().join("chevreuse");
    let written = atlas.render(&config, "plain", &formats, &prefix).await?;

    assert_eq!(written.len(), 3);
    for path in &written {
        assert!(path.exists(), "missing output file {}", path.display());
        assert!(fs::metadata(path)?.len() > 0);
    }

    // The administrative boundary is shaded with an even-odd ring pair.
    let svg = fs::read_to_string(dir.path().join("chevreuse.svg"))?;
    assert!(svg.contains("fill-rule=\"evenodd\""));

    let pdf = fs::read(dir.path().join("chevreuse.pdf"))?;
    assert!(pdf.starts_with(b"%PDF"));

    let csv = fs::read_to_string(dir.path().join("chevreuse.csv"))?;
    assert_eq!(csv.lines().next(), Some("category,name,squares"));
    assert!(csv.contains("rue de Rivoli"));

    let queries = index.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    let query = &queries[0];
    assert_eq!(query.area_id, Some(CHEVREUSE_OSMID));
    assert_eq!(query.boundary_wkt.as_deref(), Some(BOUNDARY_WKT));
    assert!(!query.squares.is_empty());

    // The index was asked about the aspect-fitted box, which must still
    // contain the database envelope.
    let envelope = BoundingBox::parse_wkt(ENVELOPE_WKT)?;
    assert!(query.bounding_box.min_lat() <= envelope.min_lat());
    assert!(query.bounding_box.max_lat() >= envelope.max_lat());
    assert!(query.bounding_box.min_lon() <= envelope.min_lon());
    assert!(query.bounding_box.max_lon() >= envelope.max_lon());

    assert_eq!(fs::read_dir(workspace_root.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_bounding_box_render_covers_every_format() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir()?;
    let atlas = test_atlas(
        dir.path(),
        Arc::new(FixedGeoProvider {
            records: Vec::new(),
        }),
        FixedIndexBuilder::new(),
    );

    let config = chevreuse_config(&atlas)
        .with_bounding_box(BoundingBox::new(48.850, 2.330, 48.868, 2.357));
    let formats = [
        OutputFormat::Png,
        OutputFormat::Svg,
        OutputFormat::Svgz,
        OutputFormat::Pdf,
        OutputFormat::Ps,
        OutputFormat::Csv,
    ];
    let prefix = dir.path().join("paris");
    let written = atlas.render(&config, "plain", &formats, &prefix).await?;

    assert_eq!(written.len(), 6);
    for path in &written {
        assert!(fs::metadata(path)?.len() > 0);
    }

    let png = fs::read(dir.path().join("paris.png"))?;
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    let svgz = fs::read(dir.path().join("paris.svgz"))?;
    assert_eq!(&svgz[..2], &[0x1f, 0x8b]);
    let ps = fs::read_to_string(dir.path().join("paris.ps"))?;
    assert!(ps.starts_with("%!PS-Adobe-3.0"));
    assert!(ps.trim_end().ends_with("%%EOF"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_area_id_fails_with_not_found() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir()?;
    let workspace_root = tempfile::tempdir()?;
    let config_path = write_config(dir.path());
    let atlas = Atlas::builder()
        .with_config_file(&config_path)
        .with_geo_provider(Arc::new(FixedGeoProvider {
            records: Vec::new(),
        }))
        .with_index_builder(FixedIndexBuilder::new())
        .with_workspace_root(workspace_root.path())
        .build()?;

    let config = chevreuse_config(&atlas).with_area_id(CHEVREUSE_OSMID);
    let err = atlas
        .render(
            &config,
            "plain",
            &[OutputFormat::Pdf],
            &dir.path().join("chevreuse"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RenderError::NotFound(_)));
    assert!(err.to_string().contains("not found"));
    assert!(!dir.path().join("chevreuse.pdf").exists());
    assert_eq!(fs::read_dir(workspace_root.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_area_and_bounding_box_is_a_precondition() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir()?;
    let atlas = test_atlas(
        dir.path(),
        Arc::new(FixedGeoProvider {
            records: Vec::new(),
        }),
        FixedIndexBuilder::new(),
    );

    let config = chevreuse_config(&atlas);
    let err = atlas
        .render(&config, "plain", &[OutputFormat::Pdf], &dir.path().join("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, RenderError::Precondition(_)));
    Ok(())
}

/// Delegates to a plain layout but fails its second output pass.
struct FlakyLayout {
    inner: PlainLayout,
    renders: Arc<AtomicUsize>,
}

impl LayoutRenderer for FlakyLayout {
    fn paper_width_pt(&self) -> f64 {
        self.inner.paper_width_pt()
    }

    fn paper_height_pt(&self) -> f64 {
        self.inner.paper_height_pt()
    }

    fn actual_bounding_box(&self) -> BoundingBox {
        self.inner.actual_bounding_box()
    }

    fn grid(&self) -> &Grid {
        self.inner.grid()
    }

    fn create_canvas(&mut self) -> papermap::Result<()> {
        self.inner.create_canvas()
    }

    fn render_shade(&mut self, shade_wkt: &str) -> papermap::Result<()> {
        self.inner.render_shade(shade_wkt)
    }

    fn compose(&mut self) -> papermap::Result<()> {
        self.inner.compose()
    }

    fn render(&self, session: &mut RenderingSession<'_>) -> papermap::Result<()> {
        if self.renders.fetch_add(1, Ordering::SeqCst) == 1 {
            return Err(RenderError::Encode("simulated backend failure".to_string()));
        }
        self.inner.render(session)
    }
}

#[tokio::test]
async fn test_format_failure_aborts_the_remaining_formats() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir()?;
    let workspace_root = tempfile::tempdir()?;
    let renders = Arc::new(AtomicUsize::new(0));
    let counter = renders.clone();

    let config_path = write_config(dir.path());
    let atlas = Atlas::builder()
        .with_config_file(&config_path)
        .with_geo_provider(Arc::new(FixedGeoProvider {
            records: Vec::new(),
        }))
        .with_index_builder(FixedIndexBuilder::new())
        .with_workspace_root(workspace_root.path())
        .register_layout(
            "flaky",
            "fails on the second output",
            Arc::new(move |job| {
                Ok(Box::new(FlakyLayout {
                    inner: PlainLayout::new(job)?,
                    renders: counter.clone(),
                }) as Box<dyn LayoutRenderer>)
            }),
        )
        .build()?;

    let config = chevreuse_config(&atlas)
        .with_bounding_box(BoundingBox::new(48.850, 2.330, 48.868, 2.357));
    let formats = [OutputFormat::Pdf, OutputFormat::Png, OutputFormat::Ps];
    let prefix = dir.path().join("map");
    let result = atlas.render(&config, "flaky", &formats, &prefix).await;

    assert!(result.is_err());
    assert_eq!(renders.load(Ordering::SeqCst), 2);

    // The file written before the failure stays on disk, the aborted format
    // was never attempted.
    let pdf = fs::read(dir.path().join("map.pdf"))?;
    assert!(pdf.starts_with(b"%PDF"));
    assert!(!dir.path().join("map.ps").exists());

    assert_eq!(fs::read_dir(workspace_root.path())?.count(), 0);
    Ok(())
}
