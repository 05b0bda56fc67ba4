use std::path::PathBuf;

use thiserror::Error;

pub const SOURCE_CLONE_HINT: &str =
    "Clone the source repository first:\ngit clone https://github.com/laisiangtho/bible.git github-bible";

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Could not decode {path:?} with any of the encodings: {}", .tried.join(", "))]
    Decode { path: PathBuf, tried: Vec<String> },

    #[error("Input file not found: {}", format_paths(.paths))]
    MissingInput { paths: Vec<PathBuf>, hint: Option<String> },

    #[error("Failed to read input file {path:?}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid source JSON in {path:?}: {source}")]
    InvalidSource {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No verses could be parsed from {path:?}")]
    NoVerses { path: PathBuf },

    #[error("Book name has no abbreviation: {0}")]
    UnmappedBook(String),

    #[error("Failed to write JSON to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown text encoding label: {0}")]
    UnknownEncoding(String),

    #[error("Invalid verse reference: {0}")]
    InvalidReference(String),
}

impl ConvertError {
    /// Remediation text to show the operator along with the error, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            ConvertError::MissingInput { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths.iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
