//! papermap CLI - city map renderer.
//!
//! Provides commands for:
//! - `stylesheets`: list the stylesheets declared in the configuration
//! - `layouts`: list the registered page layouts
//! - `paper-sizes`: list the supported paper formats
//! - `render`: render a map to one or more output files

use clap::{Args, Parser, Subcommand};
use papermap::render::paper_size_by_name;
use papermap::{Atlas, BoundingBox, Locale, OutputFormat, RenderError, RenderingConfiguration};
use std::path::PathBuf;
use std::process;

/// Renders printable city maps from OpenStreetMap data.
#[derive(Parser)]
#[command(name = "papermap", version, about)]
struct Cli {
    /// Configuration file; the default locations are tried when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the stylesheets declared in the configuration.
    Stylesheets,
    /// List the registered page layouts.
    Layouts,
    /// List the supported paper formats.
    PaperSizes,
    /// Render a map to one or more output files.
    Render(RenderArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Map title.
    #[arg(long)]
    title: String,

    /// OSM id of the administrative area to render.
    #[arg(long)]
    osmid: Option<i64>,

    /// Bounding box to render, as lat1,lon1,lat2,lon2.
    #[arg(long, value_name = "LAT1,LON1,LAT2,LON2")]
    bbox: Option<String>,

    /// Locale used for the rendered map, e.g. fr_FR.UTF-8.
    #[arg(long, default_value = "en_US.UTF-8")]
    language: String,

    /// Stylesheet name; the first configured one when omitted.
    #[arg(long)]
    stylesheet: Option<String>,

    /// Page layout name.
    #[arg(long, default_value = "plain")]
    layout: String,

    /// Paper format name, e.g. A4.
    #[arg(long, default_value = "A4")]
    paper: String,

    /// Rotate the paper to landscape orientation.
    #[arg(long)]
    landscape: bool,

    /// Output format; may be given several times.
    #[arg(long = "format", value_name = "FORMAT", required = true)]
    formats: Vec<String>,

    /// Output file prefix; files are written as <prefix>.<extension>.
    #[arg(long, default_value = "map")]
    prefix: PathBuf,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> papermap::Result<()> {
    let mut builder = Atlas::builder();
    if let Some(config) = &cli.config {
        builder = builder.with_config_file(config);
    }
    let atlas = builder.build()?;

    match cli.command {
        Commands::Stylesheets => {
            for stylesheet in atlas.stylesheets() {
                println!("{}\t{}", stylesheet.name, stylesheet.description);
            }
        }
        Commands::Layouts => {
            for (name, description) in atlas.layouts() {
                println!("{name}\t{description}");
            }
        }
        Commands::PaperSizes => {
            for size in atlas.paper_sizes() {
                println!("{}\t{} x {} mm", size.name, size.width_mm, size.height_mm);
            }
        }
        Commands::Render(args) => render(&atlas, args).await?,
    }
    Ok(())
}

async fn render(atlas: &Atlas, args: RenderArgs) -> papermap::Result<()> {
    let formats = args
        .formats
        .iter()
        .map(|f| f.parse())
        .collect::<papermap::Result<Vec<OutputFormat>>>()?;

    let paper = paper_size_by_name(&args.paper)?;
    let (width_mm, height_mm) = if args.landscape {
        (paper.height_mm, paper.width_mm)
    } else {
        (paper.width_mm, paper.height_mm)
    };

    let stylesheet = match &args.stylesheet {
        Some(name) => atlas.stylesheet_by_name(name)?.clone(),
        None => atlas.stylesheets().first().cloned().ok_or_else(|| {
            RenderError::Configuration(
                "configuration does not declare any stylesheet".to_string(),
            )
        })?,
    };

    let mut config = RenderingConfiguration::new(
        args.title.clone(),
        Locale::parse(&args.language),
        stylesheet,
        width_mm,
        height_mm,
    );
    if let Some(osmid) = args.osmid {
        config = config.with_area_id(osmid);
    }
    if let Some(bbox) = &args.bbox {
        config = config.with_bounding_box(parse_bbox(bbox)?);
    }

    let written = atlas.render(&config, &args.layout, &formats, &args.prefix).await?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn parse_bbox(text: &str) -> papermap::Result<BoundingBox> {
    let parts = text
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|_| RenderError::Precondition(format!("invalid bounding box '{text}'")))?;
    let [lat1, lon1, lat2, lon2] = parts[..] else {
        return Err(RenderError::Precondition(format!(
            "invalid bounding box '{text}'"
        )));
    };
    Ok(BoundingBox::new(lat1, lon1, lat2, lon2))
}
