use crate::stylesheet::Color;

/// Horizontal anchoring of a text run relative to its x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// One drawing instruction in paper space.
///
/// Coordinates are in points with the origin at the top-left corner and the
/// y axis growing downwards. Backends that use a bottom-left origin flip
/// during encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        alpha: f64,
    },
    /// An even-odd filled polygon: the first ring is the outline, subsequent
    /// rings punch holes.
    FillRings {
        rings: Vec<Vec<(f64, f64)>>,
        color: Color,
        alpha: f64,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        color: Color,
        alpha: f64,
        line_width: f64,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        size: f64,
        color: Color,
        anchor: TextAnchor,
    },
}

/// The recorded drawing surface a layout renderer paints onto.
///
/// Recording instead of rasterizing directly lets one composited page be
/// encoded into every requested output backend.
#[derive(Debug, Clone)]
pub struct Canvas {
    width_pt: f64,
    height_pt: f64,
    ops: Vec<DrawOp>,
}

impl Canvas {
    pub fn new(width_pt: f64, height_pt: f64) -> Self {
        Canvas {
            width_pt,
            height_pt,
            ops: Vec::new(),
        }
    }

    pub fn width_pt(&self) -> f64 {
        self.width_pt
    }

    pub fn height_pt(&self) -> f64 {
        self.height_pt
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color, alpha: f64) {
        self.ops.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
            alpha,
        });
    }

    pub fn fill_rings(&mut self, rings: Vec<Vec<(f64, f64)>>, color: Color, alpha: f64) {
        self.ops.push(DrawOp::FillRings { rings, color, alpha });
    }

    pub fn polyline(&mut self, points: Vec<(f64, f64)>, color: Color, alpha: f64, line_width: f64) {
        self.ops.push(DrawOp::Polyline {
            points,
            color,
            alpha,
            line_width,
        });
    }

    pub fn text(
        &mut self,
        x: f64,
        y: f64,
        content: impl Into<String>,
        size: f64,
        color: Color,
        anchor: TextAnchor,
    ) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            content: content.into(),
            size,
            color,
            anchor,
        });
    }

    /// Replays previously recorded instructions onto this canvas.
    pub fn extend_from(&mut self, ops: &[DrawOp]) {
        self.ops.extend_from_slice(ops);
    }
}

/// Rough advance width of a Helvetica-style run, for anchoring text in
/// backends without font metrics.
pub fn approx_text_width(content: &str, size: f64) -> f64 {
    content.chars().count() as f64 * size * 0.5
}
