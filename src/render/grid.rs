use crate::coords::BoundingBox;

pub(crate) const KM_PER_DEG_LAT: f64 = 110.574;
pub(crate) const KM_PER_DEG_LON_EQUATOR: f64 = 111.32;

/// Target edge length of one grid square, in kilometers.
const TARGET_SQUARE_KM: f64 = 0.5;

const MIN_SQUARES_PER_AXIS: usize = 2;
const MAX_COLUMNS: usize = 26;
const MAX_ROWS: usize = 99;

/// The reference grid laid over the rendered map area.
///
/// Columns carry letter labels and rows carry numbers, so each square has a
/// "A1" style name. Squares aim for roughly half a kilometer of ground
/// distance per edge. For right-to-left locales the letters run from the
/// right edge of the map, matching the reading direction of the index.
#[derive(Debug, Clone)]
pub struct Grid {
    bounding_box: BoundingBox,
    columns: usize,
    rows: usize,
    rtl: bool,
}

impl Grid {
    pub fn new(bounding_box: &BoundingBox, rtl: bool) -> Grid {
        let (mid_lat, _) = bounding_box.center();
        let width_km =
            bounding_box.lon_span() * KM_PER_DEG_LON_EQUATOR * mid_lat.to_radians().cos().abs();
        let height_km = bounding_box.lat_span() * KM_PER_DEG_LAT;

        let columns = ((width_km / TARGET_SQUARE_KM).round() as usize)
            .clamp(MIN_SQUARES_PER_AXIS, MAX_COLUMNS);
        let rows =
            ((height_km / TARGET_SQUARE_KM).round() as usize).clamp(MIN_SQUARES_PER_AXIS, MAX_ROWS);

        Grid {
            bounding_box: *bounding_box,
            columns,
            rows,
            rtl,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Label of the column at the given geographic position, counted from the
    /// western edge.
    pub fn column_label(&self, column: usize) -> String {
        let index = if self.rtl {
            self.columns - 1 - column
        } else {
            column
        };
        char::from(b'A' + index as u8).to_string()
    }

    /// Label of the row at the given position, counted from the northern edge.
    pub fn row_label(&self, row: usize) -> String {
        (row + 1).to_string()
    }

    pub fn square_label(&self, column: usize, row: usize) -> String {
        format!("{}{}", self.column_label(column), self.row_label(row))
    }

    /// Yields every grid square with its label and its geodetic outline as a
    /// WKT polygon, in row-major order from the north-western corner.
    pub fn squares_wkt(&self) -> Vec<(String, String)> {
        let cell_lon = self.bounding_box.lon_span() / self.columns as f64;
        let cell_lat = self.bounding_box.lat_span() / self.rows as f64;

        let mut squares = Vec::with_capacity(self.columns * self.rows);
        for row in 0..self.rows {
            let top = self.bounding_box.max_lat() - row as f64 * cell_lat;
            let bottom = top - cell_lat;
            for column in 0..self.columns {
                let west = self.bounding_box.min_lon() + column as f64 * cell_lon;
                let east = west + cell_lon;
                let square = BoundingBox::new(bottom, west, top, east);
                squares.push((self.square_label(column, row), square.as_wkt()));
            }
        }
        squares
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_km_box() -> BoundingBox {
        // Roughly 2 km x 2 km around central Paris.
        BoundingBox::new(48.850, 2.330, 48.868, 2.357)
    }

    #[test]
    fn test_square_count_tracks_ground_distance() {
        let grid = Grid::new(&two_km_box(), false);
        assert!(grid.columns() >= 3 && grid.columns() <= 5);
        assert!(grid.rows() >= 3 && grid.rows() <= 5);
    }

    #[test]
    fn test_labels_start_at_a1_in_the_north_west() {
        let grid = Grid::new(&two_km_box(), false);
        assert_eq!(grid.square_label(0, 0), "A1");
        assert_eq!(grid.square_label(1, 2), "B3");
    }

    #[test]
    fn test_rtl_reverses_column_letters() {
        let ltr = Grid::new(&two_km_box(), false);
        let rtl = Grid::new(&two_km_box(), true);
        assert_eq!(ltr.columns(), rtl.columns());
        let last = char::from(b'A' + (ltr.columns() - 1) as u8).to_string();
        assert_eq!(rtl.column_label(0), last);
        assert_eq!(rtl.column_label(rtl.columns() - 1), "A");
    }

    #[test]
    fn test_tiny_area_still_gets_a_minimal_grid() {
        let bbox = BoundingBox::new(48.8500, 2.3300, 48.8502, 2.3302);
        let grid = Grid::new(&bbox, false);
        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.rows(), 2);
    }

    #[test]
    fn test_squares_cover_the_whole_box() {
        let grid = Grid::new(&two_km_box(), false);
        let squares = grid.squares_wkt();
        assert_eq!(squares.len(), grid.columns() * grid.rows());
        assert_eq!(squares[0].0, "A1");
        assert!(squares[0].1.starts_with("POLYGON(("));
        let last = &squares[squares.len() - 1];
        assert_eq!(
            last.0,
            grid.square_label(grid.columns() - 1, grid.rows() - 1)
        );
    }
}
