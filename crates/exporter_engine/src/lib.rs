//! Exporter engine: browser harvesting, page rendering and book writing.
mod assembler;
mod browser;
mod dom;
mod effects;
mod epub;
mod fetch;
mod harvest;
pub mod imaging;
mod persist;
mod session;
mod types;
mod workdir;

pub use assembler::ChapterAssembler;
pub use browser::{find_chromium, BrowserSettings, ChromiumSession};
pub use dom::{image_sources, DomError};
pub use epub::EpubDocument;
pub use fetch::{FetchSettings, ImageFetcher, ReqwestImageFetcher};
pub use harvest::{ChapterHarvester, HarvestSettings, COVER_FILE, MANIFEST_FILE};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use session::{BrowserSession, ImageResponse, ResponseToken};
pub use types::{
    AssemblyError, FailureKind, FetchError, FetchMetadata, FetchOutput, HarvestError,
    HarvestResult, SessionError, WriterError,
};
pub use workdir::WorkingDirectory;
