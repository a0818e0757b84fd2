use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A color string that is not `RRGGBB` hex.
    #[error("invalid hex color {0:?}, expected RRGGBB (e.g. 1a1b26)")]
    InvalidColor(String),

    #[error("could not load font {path}: {reason}")]
    Font { path: PathBuf, reason: String },

    /// The audio output device could not be opened or rejected a buffer.
    #[error("audio device unavailable: {0}")]
    Audio(String),
}
