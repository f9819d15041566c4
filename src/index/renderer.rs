use super::StreetIndex;
use crate::error::Result;
use crate::stylesheet::Color;
use crate::surface::{Canvas, TextAnchor};
use std::io;

const HEADER_SIZE: f64 = 8.0;
const ENTRY_SIZE: f64 = 7.0;
const LINE_HEIGHT: f64 = 9.5;
const COLUMN_WIDTH: f64 = 150.0;
const COLUMN_GUTTER: f64 = 8.0;

enum IndexLine<'a> {
    Header(&'a str),
    Entry { label: &'a str, squares: &'a str },
}

/// Draws a categorized street index into a canvas region and serializes it
/// for the tabular output format.
pub struct StreetIndexRenderer {
    index: StreetIndex,
    rtl: bool,
}

impl StreetIndexRenderer {
    pub fn new(index: StreetIndex, rtl: bool) -> StreetIndexRenderer {
        StreetIndexRenderer { index, rtl }
    }

    pub fn index(&self) -> &StreetIndex {
        &self.index
    }

    /// Flows the index into columns inside the given region. Entries that do
    /// not fit the region are dropped.
    pub fn draw(&self, canvas: &mut Canvas, x: f64, y: f64, width: f64, height: f64) {
        if self.index.is_empty() || width <= 0.0 || height <= 0.0 {
            return;
        }

        let mut lines = Vec::new();
        for category in &self.index.categories {
            lines.push(IndexLine::Header(&category.name));
            for entry in &category.entries {
                lines.push(IndexLine::Entry {
                    label: &entry.label,
                    squares: &entry.squares,
                });
            }
        }

        let columns = ((width / COLUMN_WIDTH).floor() as usize).max(1);
        let column_step = width / columns as f64;
        let per_column = ((height / LINE_HEIGHT).floor() as usize).max(1);

        for (i, line) in lines.iter().enumerate() {
            let column = i / per_column;
            if column >= columns {
                break;
            }
            // Columns follow the reading direction of the locale.
            let visual_column = if self.rtl {
                columns - 1 - column
            } else {
                column
            };
            let column_x = x + visual_column as f64 * column_step;
            let column_end = column_x + column_step - COLUMN_GUTTER;
            let line_y = y + (i % per_column + 1) as f64 * LINE_HEIGHT;

            match line {
                IndexLine::Header(name) => {
                    canvas.fill_rect(
                        column_x,
                        line_y - HEADER_SIZE,
                        column_step - COLUMN_GUTTER,
                        HEADER_SIZE + 2.0,
                        Color::gray(225),
                        1.0,
                    );
                    canvas.text(
                        column_x + (column_step - COLUMN_GUTTER) / 2.0,
                        line_y,
                        *name,
                        HEADER_SIZE,
                        Color::BLACK,
                        TextAnchor::Middle,
                    );
                }
                IndexLine::Entry { label, squares } => {
                    let (label_x, label_anchor, squares_x, squares_anchor) = if self.rtl {
                        (column_end, TextAnchor::End, column_x, TextAnchor::Start)
                    } else {
                        (column_x, TextAnchor::Start, column_end, TextAnchor::End)
                    };
                    canvas.text(
                        label_x,
                        line_y,
                        *label,
                        ENTRY_SIZE,
                        Color::BLACK,
                        label_anchor,
                    );
                    canvas.text(
                        squares_x,
                        line_y,
                        *squares,
                        ENTRY_SIZE,
                        Color::gray(80),
                        squares_anchor,
                    );
                }
            }
        }
    }

    /// Writes the index as `category,name,squares` rows.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["category", "name", "squares"])?;
        for category in &self.index.categories {
            for entry in &category.entries {
                csv_writer.write_record([
                    category.name.as_str(),
                    entry.label.as_str(),
                    entry.squares.as_str(),
                ])?;
            }
        }
        csv_writer.flush()?;
        Ok(())
    }
}
