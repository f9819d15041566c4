use super::canvas::{approx_text_width, Canvas, DrawOp, TextAnchor};
use crate::stylesheet::Color;
use std::fmt::Write as _;

/// PostScript level 2 has no alpha channel; translucent fills are blended
/// against the white paper during encoding.
fn ps_color(color: Color, alpha: f64) -> String {
    let blend = |c: u8| (c as f64 * alpha + 255.0 * (1.0 - alpha)) / 255.0;
    format!(
        "{:.3} {:.3} {:.3} setrgbcolor",
        blend(color.r),
        blend(color.g),
        blend(color.b)
    )
}

fn escape(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Encodes a recorded canvas as a single-page DSC 3.0 PostScript document.
///
/// The interchange header requires an integral bounding box, so the page
/// dimensions are rounded up to whole points there.
pub fn encode(canvas: &Canvas, title: &str) -> String {
    let width = canvas.width_pt();
    let height = canvas.height_pt();
    let mut out = String::new();

    out.push_str("%!PS-Adobe-3.0\n");
    let _ = writeln!(out, "%%Title: {}", title);
    out.push_str("%%Creator: papermap\n");
    out.push_str("%%Pages: 1\n");
    let _ = writeln!(
        out,
        "%%BoundingBox: 0 0 {} {}",
        width.ceil() as i64,
        height.ceil() as i64
    );
    out.push_str("%%EndComments\n");
    out.push_str("%%Page: 1 1\n");

    for op in canvas.ops() {
        match op {
            DrawOp::FillRect {
                x,
                y,
                width: w,
                height: h,
                color,
                alpha,
            } => {
                let _ = writeln!(out, "{}", ps_color(*color, *alpha));
                out.push_str("newpath\n");
                let _ = writeln!(out, "{:.2} {:.2} moveto", x, height - y);
                let _ = writeln!(out, "{:.2} {:.2} lineto", x + w, height - y);
                let _ = writeln!(out, "{:.2} {:.2} lineto", x + w, height - (y + h));
                let _ = writeln!(out, "{:.2} {:.2} lineto", x, height - (y + h));
                out.push_str("closepath\nfill\n");
            }
            DrawOp::FillRings { rings, color, alpha } => {
                let _ = writeln!(out, "{}", ps_color(*color, *alpha));
                out.push_str("newpath\n");
                for ring in rings {
                    for (i, (px, py)) in ring.iter().enumerate() {
                        let verb = if i == 0 { "moveto" } else { "lineto" };
                        let _ = writeln!(out, "{:.2} {:.2} {}", px, height - py, verb);
                    }
                    out.push_str("closepath\n");
                }
                out.push_str("eofill\n");
            }
            DrawOp::Polyline {
                points,
                color,
                alpha,
                line_width,
            } => {
                let _ = writeln!(out, "{}", ps_color(*color, *alpha));
                let _ = writeln!(out, "{:.2} setlinewidth", line_width);
                out.push_str("newpath\n");
                for (i, (px, py)) in points.iter().enumerate() {
                    let verb = if i == 0 { "moveto" } else { "lineto" };
                    let _ = writeln!(out, "{:.2} {:.2} {}", px, height - py, verb);
                }
                out.push_str("stroke\n");
            }
            DrawOp::Text {
                x,
                y,
                content,
                size,
                color,
                anchor,
            } => {
                let shift = match anchor {
                    TextAnchor::Start => 0.0,
                    TextAnchor::Middle => approx_text_width(content, *size) / 2.0,
                    TextAnchor::End => approx_text_width(content, *size),
                };
                let _ = writeln!(out, "{}", ps_color(*color, 1.0));
                let _ = writeln!(out, "/Helvetica findfont {:.2} scalefont setfont", size);
                let _ = writeln!(out, "{:.2} {:.2} moveto", x - shift, height - y);
                let _ = writeln!(out, "({}) show", escape(content));
            }
        }
    }

    out.push_str("showpage\n");
    out.push_str("%%EOF\n");
    out
}
