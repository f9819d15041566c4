//! Map rendering pipeline orchestration.
//!
//! This module contains the entry point of the library:
//!
//! - [`AtlasBuilder`]: fluent builder loading the configuration and wiring
//!   the database-backed collaborators
//! - [`Atlas`]: renders one configuration to any number of output formats
//! - [`RenderingConfiguration`]: describes a single rendering request
//! - [`Workspace`]: scoped temporary directory for one rendering job
//!
//! # Example
//!
//! ```ignore
//! use papermap::{Atlas, OutputFormat, RenderingConfiguration};
//!
//! let atlas = Atlas::builder()
//!     .with_config_file("papermap.toml")
//!     .build()?;
//!
//! let stylesheet = atlas.stylesheet_by_name("default")?.clone();
//! let config = RenderingConfiguration::new(
//!     "Chevreuse", Locale::parse("fr_FR.UTF-8"), stylesheet, 210.0, 297.0,
//! )
//! .with_area_id(-943886);
//!
//! atlas.render(&config, "plain", &[OutputFormat::Pdf], Path::new("chevreuse")).await?;
//! ```

mod config;
mod orchestrator;
mod workspace;

pub use config::RenderingConfiguration;
pub use orchestrator::{Atlas, AtlasBuilder};
pub use workspace::Workspace;
