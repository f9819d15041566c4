use crate::coords::BoundingBox;
use crate::i18n::Locale;
use crate::stylesheet::Stylesheet;

/// Everything needed to describe one rendering request.
///
/// The writing direction is derived from the locale once at construction and
/// never changes afterwards, so every pipeline stage sees the same value. At
/// least one of the area id and the bounding box must be set before the
/// request reaches `Atlas::render`.
#[derive(Debug, Clone)]
pub struct RenderingConfiguration {
    title: String,
    area_id: Option<i64>,
    bounding_box: Option<BoundingBox>,
    language: Locale,
    stylesheet: Stylesheet,
    paper_width_mm: f64,
    paper_height_mm: f64,
    rtl: bool,
}

impl RenderingConfiguration {
    pub fn new(
        title: impl Into<String>,
        language: Locale,
        stylesheet: Stylesheet,
        paper_width_mm: f64,
        paper_height_mm: f64,
    ) -> RenderingConfiguration {
        let rtl = language.is_rtl();
        RenderingConfiguration {
            title: title.into(),
            area_id: None,
            bounding_box: None,
            language,
            stylesheet,
            paper_width_mm,
            paper_height_mm,
            rtl,
        }
    }

    /// Selects the administrative area to render by its OSM id.
    pub fn with_area_id(mut self, area_id: i64) -> Self {
        self.area_id = Some(area_id);
        self
    }

    /// Selects the geodetic box to render.
    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn area_id(&self) -> Option<i64> {
        self.area_id
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
    }

    pub fn language(&self) -> &Locale {
        &self.language
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    pub fn paper_width_mm(&self) -> f64 {
        self.paper_width_mm
    }

    pub fn paper_height_mm(&self) -> f64 {
        self.paper_height_mm
    }

    pub fn rtl(&self) -> bool {
        self.rtl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheet::Color;

    fn sample_stylesheet() -> Stylesheet {
        Stylesheet {
            name: "default".to_string(),
            path: "/usr/share/styles/default.xml".to_string(),
            description: String::new(),
            zoom_level: 16,
            grid_line_color: Color::BLACK,
            grid_line_alpha: 0.5,
            grid_line_width: 3.0,
            shade_color: Color::BLACK,
            shade_alpha: 0.1,
        }
    }

    #[test]
    fn test_direction_is_derived_from_the_locale() {
        let ltr = RenderingConfiguration::new(
            "Chevreuse",
            Locale::parse("fr_FR.UTF-8"),
            sample_stylesheet(),
            210.0,
            297.0,
        );
        assert!(!ltr.rtl());

        let rtl = RenderingConfiguration::new(
            "بيروت",
            Locale::parse("ar_LB"),
            sample_stylesheet(),
            210.0,
            297.0,
        );
        assert!(rtl.rtl());
    }

    #[test]
    fn test_area_selectors_chain() {
        let config = RenderingConfiguration::new(
            "Chevreuse",
            Locale::parse("fr_FR"),
            sample_stylesheet(),
            297.0,
            420.0,
        )
        .with_area_id(-943886)
        .with_bounding_box(BoundingBox::new(48.70, 2.01, 48.72, 2.06));

        assert_eq!(config.area_id(), Some(-943886));
        assert!(config.bounding_box().is_some());
        assert_eq!(config.paper_width_mm(), 297.0);
    }
}
