use thiserror::Error;

/// A comprehensive error type for the entire map rendering pipeline.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("precondition not met: {0}")]
    Precondition(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unreadable source data: {0}")]
    DataIntegrity(String),

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("raster encoding failed: {0}")]
    Encode(String),

    #[error("index export failed: {0}")]
    IndexExport(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
