use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating or parsing an IDD file.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read IDD file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IDD parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("No IDD file found for EnergyPlus {version} (searched: {searched:?})")]
    IddNotFound {
        version: String,
        searched: Vec<PathBuf>,
    },
}

impl SchemaError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SchemaError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        SchemaError::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
