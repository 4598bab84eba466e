use std::path::PathBuf;

use thiserror::Error;

use crate::variant::RomVariant;

pub type Result<T> = std::result::Result<T, RomError>;

#[derive(Error, Debug)]
pub enum RomError {
    #[error("File not found: {}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{variant} header needs {required} bytes, got {actual}")]
    TruncatedHeader {
        variant: RomVariant,
        required: usize,
        actual: usize,
    },
    #[error("Address {address} is outside the ROM ({size} bytes)")]
    OutOfRange { address: i64, size: u64 },
    #[error("Invalid address: {0:?}")]
    InvalidInput(String),
    #[error("{} has an unknown extension.", .0.display())]
    UnknownExtension(PathBuf),
    #[error("Emulator {} is unavailable: {reason}", path.display())]
    EmulatorUnavailable { path: PathBuf, reason: String },
    #[error("Bad config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RomError {
    /// Maps an open failure on `path` to `FileNotFound`.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> RomError {
        RomError::FileNotFound {
            path: path.into(),
            source,
        }
    }
}
