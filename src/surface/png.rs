use super::canvas::Canvas;
use super::{pt_to_dots, svg, PT_PER_INCH};
use crate::error::{RenderError, Result};
use resvg::{tiny_skia, usvg};
use std::io;
use std::sync::Arc;

/// Rasterizes a recorded canvas at the requested resolution and writes the
/// PNG encoding. The canvas is rendered through the vector markup encoder so
/// both paths produce identical geometry.
pub fn write<W: io::Write>(canvas: &Canvas, dpi: f64, writer: &mut W) -> Result<()> {
    let markup = svg::encode(canvas);

    let mut options = usvg::Options::default();
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    options.fontdb = Arc::new(fontdb);

    let tree = usvg::Tree::from_str(&markup, &options)
        .map_err(|e| RenderError::Encode(format!("failed to parse rendered markup: {e}")))?;

    let width = pt_to_dots(canvas.width_pt(), dpi);
    let height = pt_to_dots(canvas.height_pt(), dpi);
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RenderError::Encode(format!("cannot allocate a {width}x{height} pixmap")))?;

    let scale = (dpi / PT_PER_INCH) as f32;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let png = pixmap
        .encode_png()
        .map_err(|e| RenderError::Encode(format!("failed to encode png: {e}")))?;
    writer.write_all(&png)?;
    Ok(())
}
