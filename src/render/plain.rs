use super::grid::{Grid, KM_PER_DEG_LAT, KM_PER_DEG_LON_EQUATOR};
use super::{LayoutJob, LayoutRenderer, RenderingSession};
use crate::coords::BoundingBox;
use crate::error::{RenderError, Result};
use crate::stylesheet::{Color, Stylesheet};
use crate::surface::{mm_to_pt, DrawOp, TextAnchor};
use chrono::{Datelike, Utc};

const MARGIN_PT: f64 = 20.0;
const TITLE_BAND_PT: f64 = 40.0;
const FOOTER_PT: f64 = 14.0;
const BAND_GAP_PT: f64 = 8.0;

/// Share of the content height given to the street index block.
const INDEX_FRACTION: f64 = 0.18;

const TITLE_SIZE: f64 = 20.0;
const GRID_LABEL_SIZE: f64 = 8.0;
const FOOTER_SIZE: f64 = 6.5;

#[derive(Debug, Clone, Copy)]
struct Region {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// The bundled full-page layout: title band on top, the map with its grid in
/// the middle, the street index block and a copyright footer at the bottom.
pub struct PlainLayout {
    title: String,
    stylesheet: Stylesheet,
    rtl: bool,
    paper_width_pt: f64,
    paper_height_pt: f64,
    map: Region,
    index: Region,
    actual_bbox: BoundingBox,
    grid: Grid,
    ops: Vec<DrawOp>,
}

impl PlainLayout {
    pub fn new(job: &LayoutJob<'_>) -> Result<PlainLayout> {
        let config = job.config;
        let paper_width_pt = mm_to_pt(config.paper_width_mm());
        let paper_height_pt = mm_to_pt(config.paper_height_mm());

        let requested = job.bounding_box;
        if requested.lat_span() <= 0.0 || requested.lon_span() <= 0.0 {
            return Err(RenderError::Precondition(
                "the bounding box covers no area".to_string(),
            ));
        }

        let content_width = paper_width_pt - 2.0 * MARGIN_PT;
        let content_height = paper_height_pt - 2.0 * MARGIN_PT;
        let index_height = INDEX_FRACTION * content_height;
        let map_height =
            content_height - TITLE_BAND_PT - 2.0 * BAND_GAP_PT - index_height - FOOTER_PT;
        if content_width < 100.0 || map_height < 100.0 {
            return Err(RenderError::Configuration(format!(
                "a {}x{} mm page is too small for the plain layout",
                config.paper_width_mm(),
                config.paper_height_mm()
            )));
        }

        let map = Region {
            x: MARGIN_PT,
            y: MARGIN_PT + TITLE_BAND_PT + BAND_GAP_PT,
            width: content_width,
            height: map_height,
        };
        let index = Region {
            x: MARGIN_PT,
            y: map.y + map.height + BAND_GAP_PT,
            width: content_width,
            height: index_height,
        };

        let actual_bbox = fit_bounding_box(&requested, map.width, map.height);
        let rtl = config.rtl();
        let grid = Grid::new(&actual_bbox, rtl);

        Ok(PlainLayout {
            title: config.title().to_string(),
            stylesheet: config.stylesheet().clone(),
            rtl,
            paper_width_pt,
            paper_height_pt,
            map,
            index,
            actual_bbox,
            grid,
            ops: Vec::new(),
        })
    }

    /// Projects a geodetic coordinate into page points, clamped to the map
    /// viewport so out-of-view shade geometry cannot spill over the margins.
    fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = self.map.x
            + (lon - self.actual_bbox.min_lon()) / self.actual_bbox.lon_span() * self.map.width;
        let y = self.map.y
            + (self.actual_bbox.max_lat() - lat) / self.actual_bbox.lat_span() * self.map.height;
        (
            x.clamp(self.map.x, self.map.x + self.map.width),
            y.clamp(self.map.y, self.map.y + self.map.height),
        )
    }
}

/// Grows the requested box symmetrically along one axis until its ground
/// aspect ratio matches the viewport, so a square kilometer stays square on
/// paper.
fn fit_bounding_box(requested: &BoundingBox, view_width: f64, view_height: f64) -> BoundingBox {
    let (mid_lat, _) = requested.center();
    let ground_width =
        requested.lon_span() * KM_PER_DEG_LON_EQUATOR * mid_lat.to_radians().cos().abs();
    let ground_height = requested.lat_span() * KM_PER_DEG_LAT;
    if ground_width <= 0.0 || ground_height <= 0.0 {
        return *requested;
    }

    let view_aspect = view_width / view_height;
    let box_aspect = ground_width / ground_height;
    if box_aspect < view_aspect {
        let delta = requested.lon_span() * (view_aspect / box_aspect - 1.0) / 2.0;
        BoundingBox::new(
            requested.min_lat(),
            requested.min_lon() - delta,
            requested.max_lat(),
            requested.max_lon() + delta,
        )
    } else {
        let delta = requested.lat_span() * (box_aspect / view_aspect - 1.0) / 2.0;
        BoundingBox::new(
            requested.min_lat() - delta,
            requested.min_lon(),
            requested.max_lat() + delta,
            requested.max_lon(),
        )
    }
}

fn parse_multipolygon(wkt: &str) -> Result<Vec<Vec<(f64, f64)>>> {
    let inner = wkt
        .trim()
        .strip_prefix("MULTIPOLYGON(((")
        .and_then(|rest| rest.strip_suffix(")))"))
        .ok_or_else(|| RenderError::DataIntegrity(format!("not a multipolygon: {wkt}")))?;

    let mut rings = Vec::new();
    for ring_text in inner.split(")),((") {
        let mut ring = Vec::new();
        for pair in ring_text.split(',') {
            let mut parts = pair.split_whitespace();
            let (Some(lon), Some(lat)) = (parts.next(), parts.next()) else {
                return Err(RenderError::DataIntegrity(format!(
                    "bad coordinate pair '{pair}'"
                )));
            };
            let lon: f64 = lon.parse().map_err(|_| {
                RenderError::DataIntegrity(format!("bad coordinate pair '{pair}'"))
            })?;
            let lat: f64 = lat.parse().map_err(|_| {
                RenderError::DataIntegrity(format!("bad coordinate pair '{pair}'"))
            })?;
            ring.push((lat, lon));
        }
        if ring.len() < 3 {
            return Err(RenderError::DataIntegrity(
                "degenerate ring in the shade region".to_string(),
            ));
        }
        rings.push(ring);
    }
    Ok(rings)
}

impl LayoutRenderer for PlainLayout {
    fn paper_width_pt(&self) -> f64 {
        self.paper_width_pt
    }

    fn paper_height_pt(&self) -> f64 {
        self.paper_height_pt
    }

    fn actual_bounding_box(&self) -> BoundingBox {
        self.actual_bbox
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn create_canvas(&mut self) -> Result<()> {
        self.ops.push(DrawOp::FillRect {
            x: 0.0,
            y: 0.0,
            width: self.paper_width_pt,
            height: self.paper_height_pt,
            color: Color::WHITE,
            alpha: 1.0,
        });

        self.ops.push(DrawOp::FillRect {
            x: MARGIN_PT,
            y: MARGIN_PT,
            width: self.paper_width_pt - 2.0 * MARGIN_PT,
            height: TITLE_BAND_PT,
            color: Color::gray(242),
            alpha: 1.0,
        });
        self.ops.push(DrawOp::Text {
            x: self.paper_width_pt / 2.0,
            y: MARGIN_PT + TITLE_BAND_PT / 2.0 + TITLE_SIZE / 3.0,
            content: self.title.clone(),
            size: TITLE_SIZE,
            color: Color::BLACK,
            anchor: TextAnchor::Middle,
        });

        self.ops.push(DrawOp::FillRect {
            x: self.map.x,
            y: self.map.y,
            width: self.map.width,
            height: self.map.height,
            color: Color::gray(247),
            alpha: 1.0,
        });
        self.ops.push(DrawOp::Polyline {
            points: vec![
                (self.map.x, self.map.y),
                (self.map.x + self.map.width, self.map.y),
                (self.map.x + self.map.width, self.map.y + self.map.height),
                (self.map.x, self.map.y + self.map.height),
                (self.map.x, self.map.y),
            ],
            color: Color::BLACK,
            alpha: 1.0,
            line_width: 1.0,
        });
        Ok(())
    }

    fn render_shade(&mut self, shade_wkt: &str) -> Result<()> {
        let rings = parse_multipolygon(shade_wkt)?;
        let projected = rings
            .into_iter()
            .map(|ring| {
                ring.into_iter()
                    .map(|(lat, lon)| self.project(lat, lon))
                    .collect()
            })
            .collect();
        self.ops.push(DrawOp::FillRings {
            rings: projected,
            color: self.stylesheet.shade_color,
            alpha: self.stylesheet.shade_alpha,
        });
        Ok(())
    }

    fn compose(&mut self) -> Result<()> {
        let cell_width = self.map.width / self.grid.columns() as f64;
        let cell_height = self.map.height / self.grid.rows() as f64;

        for column in 1..self.grid.columns() {
            let x = self.map.x + column as f64 * cell_width;
            self.ops.push(DrawOp::Polyline {
                points: vec![(x, self.map.y), (x, self.map.y + self.map.height)],
                color: self.stylesheet.grid_line_color,
                alpha: self.stylesheet.grid_line_alpha,
                line_width: self.stylesheet.grid_line_width,
            });
        }
        for row in 1..self.grid.rows() {
            let y = self.map.y + row as f64 * cell_height;
            self.ops.push(DrawOp::Polyline {
                points: vec![(self.map.x, y), (self.map.x + self.map.width, y)],
                color: self.stylesheet.grid_line_color,
                alpha: self.stylesheet.grid_line_alpha,
                line_width: self.stylesheet.grid_line_width,
            });
        }

        for column in 0..self.grid.columns() {
            self.ops.push(DrawOp::Text {
                x: self.map.x + (column as f64 + 0.5) * cell_width,
                y: self.map.y + GRID_LABEL_SIZE + 2.0,
                content: self.grid.column_label(column),
                size: GRID_LABEL_SIZE,
                color: self.stylesheet.grid_line_color,
                anchor: TextAnchor::Middle,
            });
        }
        for row in 0..self.grid.rows() {
            let (x, anchor) = if self.rtl {
                (self.map.x + self.map.width - 4.0, TextAnchor::End)
            } else {
                (self.map.x + 4.0, TextAnchor::Start)
            };
            self.ops.push(DrawOp::Text {
                x,
                y: self.map.y + (row as f64 + 0.5) * cell_height + GRID_LABEL_SIZE / 3.0,
                content: self.grid.row_label(row),
                size: GRID_LABEL_SIZE,
                color: self.stylesheet.grid_line_color,
                anchor,
            });
        }
        Ok(())
    }

    fn render(&self, session: &mut RenderingSession<'_>) -> Result<()> {
        let canvas = session.surface.canvas_mut();
        canvas.extend_from(&self.ops);

        session.index.draw(
            canvas,
            self.index.x,
            self.index.y,
            self.index.width,
            self.index.height,
        );

        let now = Utc::now();
        let footer = format!(
            "Map data (c) {} OpenStreetMap contributors. Rendered on {}.",
            now.year(),
            now.format("%Y-%m-%d")
        );
        let (x, anchor) = if self.rtl {
            (self.paper_width_pt - MARGIN_PT, TextAnchor::End)
        } else {
            (MARGIN_PT, TextAnchor::Start)
        };
        canvas.text(
            x,
            self.paper_height_pt - MARGIN_PT - 3.0,
            footer,
            FOOTER_SIZE,
            Color::gray(100),
            anchor,
        );
        Ok(())
    }
}
