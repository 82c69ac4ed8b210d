//! Error types for docblocks.
//!
//! Converting tokens to blocks never fails; these cover everything around it.

use std::io;
use thiserror::Error;

/// Result type alias for docblocks operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The style config file is not valid TOML or has the wrong shape.
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// The token dump is not a valid JSON token array.
    #[error("Invalid token dump: {0}")]
    Tokens(#[from] serde_json::Error),

    /// Typst rejected the generated markup.
    #[error("Typst compilation failed: {0}")]
    Compile(String),

    /// Typst compiled the document but PDF export failed.
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}
