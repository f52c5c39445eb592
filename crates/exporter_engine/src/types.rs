use std::fmt;
use std::path::{Path, PathBuf};

use exporter_core::HarvestFailure;
use thiserror::Error;

use crate::dom::DomError;
use crate::persist::PersistError;
use crate::workdir::WorkingDirectory;

/// A harvested chapter, handed from the harvester to the assembler.
#[derive(Debug)]
pub struct HarvestResult {
    pub working_dir: WorkingDirectory,
    /// Stored pages sorted by file name, which is reading order.
    pub ordered_image_paths: Vec<PathBuf>,
    pub cover_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Chromium not found; set MANGA_EXPORTER_CHROME or configure chrome_path")]
    ChromiumNotFound,
    #[error("failed to launch Chromium: {0}")]
    Launch(String),
    #[error("browser protocol error: {0}")]
    Cdp(String),
}

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Failed(#[from] HarvestFailure),
    #[error(transparent)]
    Browser(#[from] SessionError),
    #[error("working directory: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("no body for {url}: {message}")]
    MissingBody { url: String, message: String },
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl HarvestError {
    /// The collection failure, when the harvest ended in one.
    pub fn failure(&self) -> Option<&HarvestFailure> {
        match self {
            HarvestError::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("book metadata is missing {}", .0.join(", "))]
    EmptyMetadata(Vec<&'static str>),
    #[error("asset {0} added twice")]
    DuplicateAsset(String),
    #[error("asset {} cannot be read: {message}", path.display())]
    MissingAsset { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("cannot read image {}: {message}", path.display())]
    UnreadableImage { path: PathBuf, message: String },
    #[error("cannot encode {}: {message}", path.display())]
    ImageEncoding { path: PathBuf, message: String },
    #[error(transparent)]
    WriterFailure(#[from] WriterError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("chapter has no pages")]
    NoPages,
}

impl AssemblyError {
    pub(crate) fn unreadable(path: &Path, err: impl fmt::Display) -> Self {
        AssemblyError::UnreadableImage {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
