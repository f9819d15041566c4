use super::canvas::{approx_text_width, Canvas, DrawOp, TextAnchor};
use crate::error::Result;
use crate::stylesheet::Color;
use printpdf::graphics::{Line, LinePoint, PaintMode, Point, Polygon, PolygonRing, WindingOrder};
use printpdf::matrix::TextMatrix;
use printpdf::ops::Op;
use printpdf::text::TextItem;
use printpdf::{
    BuiltinFont, Layer, Mm, PdfConformance, PdfDocument, PdfPage, PdfSaveOptions, Pt, Rgb,
};
use std::io;

const PAGE_FONT: BuiltinFont = BuiltinFont::Helvetica;

/// PDF content streams carry no alpha channel here; translucent fills are
/// blended against the white paper during encoding.
fn pdf_color(color: Color, alpha: f64) -> printpdf::color::Color {
    let blend = |c: u8| ((c as f64 * alpha + 255.0 * (1.0 - alpha)) / 255.0) as f32;
    printpdf::color::Color::Rgb(Rgb::new(
        blend(color.r),
        blend(color.g),
        blend(color.b),
        None,
    ))
}

fn ring_points(points: &[(f64, f64)], page_height_pt: f64) -> Vec<LinePoint> {
    points
        .iter()
        .map(|&(x, y)| LinePoint {
            p: Point {
                x: Pt(x as f32),
                y: Pt((page_height_pt - y) as f32),
            },
            bezier: false,
        })
        .collect()
}

/// Encodes a recorded canvas as a single-page PDF document.
pub fn write<W: io::Write>(canvas: &Canvas, title: &str, writer: &mut W) -> Result<()> {
    let mut document = PdfDocument::new(title);
    document.metadata.info.conformance = PdfConformance::X3_2002_PDF_1_3;

    let page_height_pt = canvas.height_pt();
    let layer_id = document.add_layer(&Layer::new("Page 1 Layer 1"));
    let mut ops = vec![Op::BeginLayer { layer_id }];

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
                let corners = [
                    (*x, *y),
                    (*x + *width, *y),
                    (*x + *width, *y + *height),
                    (*x, *y + *height),
                ];
                let polygon = Polygon {
                    rings: vec![PolygonRing {
                        points: ring_points(&corners, page_height_pt),
                    }],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::EvenOdd,
                };
                ops.push(Op::SetFillColor {
                    col: pdf_color(*color, *alpha),
                });
                ops.push(Op::DrawPolygon { polygon });
            }
            DrawOp::FillRings { rings, color, alpha } => {
                let polygon = Polygon {
                    rings: rings
                        .iter()
                        .map(|ring| PolygonRing {
                            points: ring_points(ring, page_height_pt),
                        })
                        .collect(),
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::EvenOdd,
                };
                ops.push(Op::SetFillColor {
                    col: pdf_color(*color, *alpha),
                });
                ops.push(Op::DrawPolygon { polygon });
            }
            DrawOp::Polyline {
                points,
                color,
                alpha,
                line_width,
            } => {
                ops.push(Op::SetOutlineColor {
                    col: pdf_color(*color, *alpha),
                });
                ops.push(Op::SetOutlineThickness {
                    pt: Pt(*line_width as f32),
                });
                ops.push(Op::DrawLine {
                    line: Line {
                        points: ring_points(points, page_height_pt),
                        is_closed: false,
                    },
                });
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
                ops.push(Op::StartTextSection);
                ops.push(Op::SetFillColor {
                    col: pdf_color(*color, 1.0),
                });
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(*size as f32),
                    font: PAGE_FONT,
                });
                ops.push(Op::SetTextMatrix {
                    matrix: TextMatrix::Translate(
                        Pt((*x - shift) as f32),
                        Pt((page_height_pt - *y) as f32),
                    ),
                });
                ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(content.clone())],
                    font: PAGE_FONT,
                });
                ops.push(Op::EndTextSection);
            }
        }
    }

    let width_mm: Mm = Pt(canvas.width_pt() as f32).into();
    let height_mm: Mm = Pt(canvas.height_pt() as f32).into();
    document.pages.push(PdfPage::new(width_mm, height_mm, ops));

    let mut warnings = Vec::new();
    document.save_writer(writer, &PdfSaveOptions::default(), &mut warnings);
    Ok(())
}
