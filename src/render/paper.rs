use crate::error::{RenderError, Result};

/// A well-known paper format, dimensions in portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperSize {
    pub name: &'static str,
    pub width_mm: f64,
    pub height_mm: f64,
}

const PAPER_SIZES: &[PaperSize] = &[
    PaperSize {
        name: "A5",
        width_mm: 148.0,
        height_mm: 210.0,
    },
    PaperSize {
        name: "A4",
        width_mm: 210.0,
        height_mm: 297.0,
    },
    PaperSize {
        name: "A3",
        width_mm: 297.0,
        height_mm: 420.0,
    },
    PaperSize {
        name: "A2",
        width_mm: 420.0,
        height_mm: 594.0,
    },
    PaperSize {
        name: "A1",
        width_mm: 594.0,
        height_mm: 841.0,
    },
    PaperSize {
        name: "A0",
        width_mm: 841.0,
        height_mm: 1189.0,
    },
    PaperSize {
        name: "US letter",
        width_mm: 216.0,
        height_mm: 279.0,
    },
    PaperSize {
        name: "US legal",
        width_mm: 216.0,
        height_mm: 356.0,
    },
];

/// The catalog of supported paper formats.
pub fn paper_sizes() -> &'static [PaperSize] {
    PAPER_SIZES
}

/// Case-insensitive lookup of a paper format by name.
pub fn paper_size_by_name(name: &str) -> Result<&'static PaperSize> {
    PAPER_SIZES
        .iter()
        .find(|size| size.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| RenderError::NotFound(format!("paper size '{name}' is not known")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let a4 = paper_size_by_name("a4").unwrap();
        assert_eq!(a4.width_mm, 210.0);
        assert_eq!(a4.height_mm, 297.0);
        assert_eq!(paper_size_by_name("US LETTER").unwrap().name, "US letter");
    }

    #[test]
    fn test_unknown_size_is_not_found() {
        let err = paper_size_by_name("B12").unwrap_err();
        assert!(matches!(err, RenderError::NotFound(_)));
    }
}
