use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad or unsupported job option (media, resolution, copies, format).
    #[error("{0}")]
    Config(String),

    /// Input document cannot be used (unreadable, locked, printing forbidden).
    #[error("{0}")]
    Input(String),

    /// Page header could not be constructed for the requested geometry.
    #[error("raster setup failed: {0}")]
    RasterSetup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
