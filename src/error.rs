use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FirError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid parameters: {0}")]
    InvalidSpec(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Integer overflow at output index {index}: value leaves the {bits}-bit range")]
    OverflowDetected { index: usize, bits: u32 },

    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed integer at {}:{line}: {content:?}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FirError>;
