use super::canvas::{Canvas, DrawOp, TextAnchor};
use crate::stylesheet::Color;

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn anchor_attr(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    }
}

/// Encodes a recorded canvas as standalone SVG markup.
///
/// Coordinates stay in points; the document's user unit is set to match, so
/// the rasterizer can scale it by `dpi / 72` without unit juggling.
pub fn encode(canvas: &Canvas) -> String {
    let width = canvas.width_pt();
    let height = canvas.height_pt();

    let mut svg = String::with_capacity(4096);
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">\n"
    ));

    for op in canvas.ops() {
        match op {
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
                alpha,
            } => {
                svg.push_str(&format!(
                    "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{}\" fill-opacity=\"{alpha}\"/>\n",
                    hex(*color)
                ));
            }
            DrawOp::FillRings { rings, color, alpha } => {
                let mut d = String::new();
                for ring in rings {
                    for (i, (x, y)) in ring.iter().enumerate() {
                        let cmd = if i == 0 { 'M' } else { 'L' };
                        d.push_str(&format!("{cmd}{x:.2} {y:.2} "));
                    }
                    d.push_str("Z ");
                }
                svg.push_str(&format!(
                    "<path d=\"{}\" fill=\"{}\" fill-rule=\"evenodd\" fill-opacity=\"{alpha}\"/>\n",
                    d.trim_end(),
                    hex(*color)
                ));
            }
            DrawOp::Polyline {
                points,
                color,
                alpha,
                line_width,
            } => {
                let coords: Vec<String> = points
                    .iter()
                    .map(|(x, y)| format!("{x:.2},{y:.2}"))
                    .collect();
                svg.push_str(&format!(
                    "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-opacity=\"{alpha}\" stroke-width=\"{line_width:.2}\"/>\n",
                    coords.join(" "),
                    hex(*color)
                ));
            }
            DrawOp::Text {
                x,
                y,
                content,
                size,
                color,
                anchor,
            } => {
                svg.push_str(&format!(
                    "<text x=\"{x:.2}\" y=\"{y:.2}\" font-family=\"Helvetica, sans-serif\" font-size=\"{size:.2}\" fill=\"{}\" text-anchor=\"{}\">{}</text>\n",
                    hex(*color),
                    anchor_attr(*anchor),
                    escape(content)
                ));
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}
