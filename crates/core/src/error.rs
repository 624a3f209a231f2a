use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("failed to read {}: {reason}", .path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error(transparent)]
    Index(#[from] IndexError),
}

impl From<walkdir::Error> for IngestError {
    fn from(value: walkdir::Error) -> Self {
        Self::Io(value.into())
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("{} not found. Run `pdf-qa ingest` first.", .0.display())]
    NotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("could not replace {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding request failed ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("invalid response from embedding provider: {0}")]
    Malformed(String),
}
