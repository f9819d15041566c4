//! # papermap
//!
//! City map and atlas rendering engine for OpenStreetMap data.
//!
//! This crate renders printable city maps from an osm2pgsql spatial
//! database:
//! - **config**: TOML configuration loading
//! - **stylesheet**: map stylesheet registry
//! - **coords**: geodetic bounding boxes and their WKT forms
//! - **geo**: administrative area lookup and shade computation
//! - **render**: page layouts, the reference grid and paper formats
//! - **index**: street index construction, drawing and CSV export
//! - **surface**: output surfaces (PDF, PostScript, SVG, SVGZ, PNG)
//! - **pipeline**: the [`Atlas`] entry point orchestrating rendering jobs
//!
//! Rendering is driven from an [`Atlas`] built out of a TOML configuration
//! file; see the [`pipeline`] module for an end-to-end example.

pub mod config;
pub mod coords;
pub mod db;
pub mod error;
pub mod geo;
pub mod i18n;
pub mod index;
pub mod pipeline;
pub mod render;
pub mod stylesheet;
pub mod surface;

// Re-export commonly used types
pub use coords::BoundingBox;
pub use error::{RenderError, Result};
pub use i18n::Locale;
pub use pipeline::{Atlas, AtlasBuilder, RenderingConfiguration, Workspace};
pub use stylesheet::Stylesheet;
pub use surface::OutputFormat;
