//! Output surfaces for the rendering pipeline.
//!
//! A [`Surface`] records drawing operations on a [`Canvas`] measured in
//! points, then encodes them into the requested file format when finished.
//! The CSV format is index-only and never allocates a drawing surface.

pub mod canvas;
mod pdf;
mod png;
mod ps;
mod svg;

pub use canvas::{Canvas, DrawOp, TextAnchor};

use crate::error::{RenderError, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const PT_PER_INCH: f64 = 72.0;

/// Largest raster edge the PNG writer accepts, in dots.
const MAX_PNG_DOTS: u32 = 32767;

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_INCH / 25.4
}

pub(crate) fn pt_to_dots(pt: f64, dpi: f64) -> u32 {
    (pt * dpi / PT_PER_INCH).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Png,
    Svg,
    Svgz,
    Pdf,
    Ps,
    Csv,
}

impl OutputFormat {
    pub fn all() -> &'static [OutputFormat] {
        &[
            OutputFormat::Png,
            OutputFormat::Svg,
            OutputFormat::Svgz,
            OutputFormat::Pdf,
            OutputFormat::Ps,
            OutputFormat::Csv,
        ]
    }

    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Svgz => "svgz",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Ps => "ps",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            "svgz" => Ok(OutputFormat::Svgz),
            "pdf" => Ok(OutputFormat::Pdf),
            "ps" => Ok(OutputFormat::Ps),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(RenderError::UnsupportedFormat(format!(
                "output format '{other}' is not supported"
            ))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// A drawing target bound to an output file.
#[derive(Debug)]
pub struct Surface {
    format: OutputFormat,
    canvas: Canvas,
    dpi: f64,
    writer: BufWriter<File>,
    path: PathBuf,
}

impl Surface {
    /// Opens the output file and prepares a canvas of the given page size.
    ///
    /// Returns `Ok(None)` for the CSV format, which carries no drawing
    /// surface. The output file is created eagerly so an unwritable
    /// destination fails before any rendering work is done.
    pub fn create(
        format: OutputFormat,
        width_pt: f64,
        height_pt: f64,
        dpi: f64,
        path: &Path,
    ) -> Result<Option<Surface>> {
        if format == OutputFormat::Csv {
            return Ok(None);
        }
        if !(width_pt.is_finite() && height_pt.is_finite() && width_pt > 0.0 && height_pt > 0.0) {
            return Err(RenderError::Precondition(format!(
                "surface dimensions must be strictly positive, got {width_pt}x{height_pt} points"
            )));
        }
        if !(dpi.is_finite() && dpi > 0.0) {
            return Err(RenderError::Precondition(format!(
                "resolution must be strictly positive, got {dpi} dpi"
            )));
        }
        if format == OutputFormat::Png {
            let w = pt_to_dots(width_pt, dpi);
            let h = pt_to_dots(height_pt, dpi);
            if !(1..=MAX_PNG_DOTS).contains(&w) || !(1..=MAX_PNG_DOTS).contains(&h) {
                return Err(RenderError::Precondition(format!(
                    "a {w}x{h} pixel raster is outside the supported size"
                )));
            }
        }

        let file = File::create(path)?;
        Ok(Some(Surface {
            format,
            canvas: Canvas::new(width_pt, height_pt),
            dpi,
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        }))
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Encodes the recorded canvas into the output file and flushes it.
    pub fn finish(mut self) -> Result<()> {
        debug!("Writing {}...", self.path.display());
        let title = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "map".to_string());

        match self.format {
            OutputFormat::Svg => {
                self.writer.write_all(svg::encode(&self.canvas).as_bytes())?;
            }
            OutputFormat::Svgz => {
                let mut encoder = GzEncoder::new(&mut self.writer, Compression::default());
                encoder.write_all(svg::encode(&self.canvas).as_bytes())?;
                encoder.finish()?;
            }
            OutputFormat::Pdf => {
                pdf::write(&self.canvas, &title, &mut self.writer)?;
            }
            OutputFormat::Ps => {
                self.writer
                    .write_all(ps::encode(&self.canvas, &title).as_bytes())?;
            }
            OutputFormat::Png => {
                png::write(&self.canvas, self.dpi, &mut self.writer)?;
            }
            OutputFormat::Csv => unreachable!(),
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheet::Color;
    use std::fs;

    #[test]
    fn test_format_parsing_is_case_insensitive() {
        assert_eq!("PDF".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert_eq!("Svgz".parse::<OutputFormat>().unwrap(), OutputFormat::Svgz);
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = "tiff".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("tiff"));
    }

    #[test]
    fn test_mm_to_pt_a4() {
        assert!((mm_to_pt(210.0) - 595.27).abs() < 0.01);
        assert!((mm_to_pt(297.0) - 841.88).abs() < 0.01);
    }

    #[test]
    fn test_unit_round_trip_stays_within_one_dot() {
        for dpi in [72.0, 300.0] {
            for mm in [1.0, 25.4, 210.0, 296.7, 420.0] {
                let dots = pt_to_dots(mm_to_pt(mm), dpi);
                let back_pt = f64::from(dots) * PT_PER_INCH / dpi;
                let back_mm = back_pt * 25.4 / PT_PER_INCH;
                assert!(
                    (back_mm - mm).abs() <= 25.4 / dpi,
                    "{mm} mm at {dpi} dpi came back as {back_mm} mm"
                );
            }
        }
    }

    #[test]
    fn test_csv_has_no_drawing_surface() {
        let dir = tempfile::tempdir().unwrap();
        let surface = Surface::create(
            OutputFormat::Csv,
            100.0,
            100.0,
            72.0,
            &dir.path().join("index.csv"),
        )
        .unwrap();
        assert!(surface.is_none());
    }

    #[test]
    fn test_zero_dimensions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Surface::create(
            OutputFormat::Svg,
            0.0,
            100.0,
            72.0,
            &dir.path().join("map.svg"),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Precondition(_)));
    }

    #[test]
    fn test_oversized_raster_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Surface::create(
            OutputFormat::Png,
            10000.0,
            100.0,
            300.0,
            &dir.path().join("map.png"),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Precondition(_)));
    }

    #[test]
    fn test_svg_surface_writes_markup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.svg");
        let mut surface = Surface::create(OutputFormat::Svg, 200.0, 100.0, 72.0, &path)
            .unwrap()
            .unwrap();
        surface
            .canvas_mut()
            .fill_rect(0.0, 0.0, 200.0, 100.0, Color::WHITE, 1.0);
        surface.finish().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<?xml"));
        assert!(written.contains("<svg"));
    }

    #[test]
    fn test_svgz_surface_is_gzip_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.svgz");
        let mut surface = Surface::create(OutputFormat::Svgz, 200.0, 100.0, 72.0, &path)
            .unwrap()
            .unwrap();
        surface
            .canvas_mut()
            .fill_rect(0.0, 0.0, 200.0, 100.0, Color::WHITE, 1.0);
        surface.finish().unwrap();

        let written = fs::read(&path).unwrap();
        assert_eq!(&written[..2], &[0x1f, 0x8b]);
    }
}
