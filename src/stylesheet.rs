use crate::config::FileConfig;
use crate::error::{RenderError, Result};
use log::debug;
use serde::Deserialize;
use std::str::FromStr;

pub const DEFAULT_ZOOM_LEVEL: u8 = 16;

/// An opaque RGB color, parsed from a hex triplet or a well-known name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn gray(value: u8) -> Self {
        Color {
            r: value,
            g: value,
            b: value,
        }
    }
}

impl FromStr for Color {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            let parse = |chunk: &str| {
                u8::from_str_radix(chunk, 16)
                    .map_err(|_| RenderError::Configuration(format!("invalid color: {s}")))
            };
            return match hex.len() {
                6 => Ok(Color {
                    r: parse(&hex[0..2])?,
                    g: parse(&hex[2..4])?,
                    b: parse(&hex[4..6])?,
                }),
                3 => {
                    let expand = |chunk: &str| parse(&format!("{chunk}{chunk}"));
                    Ok(Color {
                        r: expand(&hex[0..1])?,
                        g: expand(&hex[1..2])?,
                        b: expand(&hex[2..3])?,
                    })
                }
                _ => Err(RenderError::Configuration(format!("invalid color: {s}"))),
            };
        }

        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Color::BLACK),
            "white" => Ok(Color::WHITE),
            "red" => Ok(Color { r: 255, g: 0, b: 0 }),
            "green" => Ok(Color { r: 0, g: 128, b: 0 }),
            "blue" => Ok(Color { r: 0, g: 0, b: 255 }),
            "yellow" => Ok(Color {
                r: 255,
                g: 255,
                b: 0,
            }),
            "gray" | "grey" => Ok(Color::gray(128)),
            _ => Err(RenderError::Configuration(format!(
                "unrecognized color name: {s}"
            ))),
        }
    }
}

/// A raw stylesheet section as it appears in the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct StylesheetSection {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_zoom_level")]
    pub zoom_level: u8,
    #[serde(default = "default_line_color")]
    pub grid_line_color: String,
    #[serde(default = "default_grid_line_alpha")]
    pub grid_line_alpha: f64,
    #[serde(default = "default_grid_line_width")]
    pub grid_line_width: f64,
    #[serde(default = "default_line_color")]
    pub shade_color: String,
    #[serde(default = "default_shade_alpha")]
    pub shade_alpha: f64,
}

fn default_zoom_level() -> u8 {
    DEFAULT_ZOOM_LEVEL
}

fn default_line_color() -> String {
    "black".to_string()
}

fn default_grid_line_alpha() -> f64 {
    0.5
}

fn default_grid_line_width() -> f64 {
    3.0
}

fn default_shade_alpha() -> f64 {
    0.1
}

/// A fully validated stylesheet: the style descriptor path plus the grid and
/// shade styling parameters the layout renderers honor.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    pub name: String,
    pub path: String,
    pub description: String,
    pub zoom_level: u8,
    pub grid_line_color: Color,
    pub grid_line_alpha: f64,
    pub grid_line_width: f64,
    pub shade_color: Color,
    pub shade_alpha: f64,
}

impl Stylesheet {
    fn from_section(section_name: &str, section: &StylesheetSection) -> Result<Self> {
        let parse_color = |field: &str, value: &str| {
            value.parse::<Color>().map_err(|e| {
                RenderError::Configuration(format!(
                    "stylesheet section '{section_name}', {field}: {e}"
                ))
            })
        };

        Ok(Stylesheet {
            name: section.name.clone(),
            path: section.path.clone(),
            description: section.description.clone(),
            zoom_level: section.zoom_level,
            grid_line_color: parse_color("grid_line_color", &section.grid_line_color)?,
            grid_line_alpha: section.grid_line_alpha,
            grid_line_width: section.grid_line_width,
            shade_color: parse_color("shade_color", &section.shade_color)?,
            shade_alpha: section.shade_alpha,
        })
    }
}

/// The ordered collection of stylesheets declared by the configuration.
///
/// Loaded once at startup and immutable afterwards. Duplicate names are
/// tolerated; lookups resolve to the first registered entry.
#[derive(Debug, Clone)]
pub struct StylesheetRegistry {
    stylesheets: Vec<Stylesheet>,
}

impl StylesheetRegistry {
    pub fn load_all(config: &FileConfig) -> Result<Self> {
        let names: Vec<&str> = config
            .rendering
            .available_stylesheets
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();

        if names.is_empty() {
            return Err(RenderError::Configuration(
                "configuration does not declare any stylesheet".to_string(),
            ));
        }

        let mut stylesheets = Vec::with_capacity(names.len());
        for name in names {
            let section = config.stylesheets.get(name).ok_or_else(|| {
                RenderError::Configuration(format!(
                    "available_stylesheets references missing section '{name}'"
                ))
            })?;
            stylesheets.push(Stylesheet::from_section(name, section)?);
        }

        debug!("Found {} map stylesheets.", stylesheets.len());
        Ok(StylesheetRegistry { stylesheets })
    }

    pub fn all(&self) -> &[Stylesheet] {
        &self.stylesheets
    }

    pub fn by_name(&self, name: &str) -> Result<&Stylesheet> {
        self.stylesheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| RenderError::NotFound(format!("stylesheet '{name}' is not registered")))
    }
}
