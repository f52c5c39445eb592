use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Writability check: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Atomically write `{dir}/{filename}`: the content goes to a temp file in the
/// same directory which is renamed over the target once complete. An existing
/// target stays readable until the rename.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    /// Checks `dir` once, creating it if missing.
    pub fn new(dir: PathBuf) -> Result<Self, PersistError> {
        ensure_output_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        self.write_with(filename, |file: &mut File| -> Result<(), PersistError> {
            file.write_all(content)?;
            Ok(())
        })
    }

    /// Streams the content through `fill`. Nothing appears at the target when
    /// `fill` fails; the temp file is removed on drop.
    pub fn write_with<F, E>(&self, filename: &str, fill: F) -> Result<PathBuf, E>
    where
        F: FnOnce(&mut File) -> Result<(), E>,
        E: From<PersistError>,
    {
        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(PersistError::from)?;
        fill(tmp.as_file_mut())?;
        tmp.flush().map_err(PersistError::from)?;
        tmp.as_file_mut().sync_all().map_err(PersistError::from)?;

        tmp.persist(&target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}
