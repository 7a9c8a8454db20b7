use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the converter can report.
///
/// Precondition variants are raised before any output is written; `Record`
/// wraps whatever went wrong while processing one input file.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed label list, line {line}: expected `{expected}`, found `{found}`")]
    MalformedLabels {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("malformed label mapping, line {line}: {reason}")]
    MalformedMapping { line: usize, reason: String },

    #[error("output directory already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("input directory does not exist: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("base name `{base}` is produced by both {} and {}", .first.display(), .second.display())]
    DuplicateBaseName {
        base: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("label `{label}` (resolved as `{resolved}`) is not in the class list")]
    UnknownLabel { label: String, resolved: String },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("record has no embedded image data and {} does not exist", .0.display())]
    MissingImage(PathBuf),

    #[error("invalid input pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("font error: {0}")]
    Font(String),

    #[error("failed to process {}: {source}", .path.display())]
    Record {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("{failed} of {total} records failed")]
    Incomplete { failed: usize, total: usize },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
