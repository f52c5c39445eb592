use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use exporter_logging::exporter_debug;

/// Scratch directory of one chapter run. Harvested images, derivatives and
/// the manifest live here until the book is written.
///
/// The directory is not removed on drop: a failed harvest keeps it for
/// inspection. Callers remove it with [`WorkingDirectory::release`].
#[derive(Debug)]
pub struct WorkingDirectory {
    path: PathBuf,
}

impl WorkingDirectory {
    /// Fresh, uniquely named directory under the system temp dir.
    pub fn create(slug: &str, chapter_id: &str) -> io::Result<Self> {
        Self::create_in(&std::env::temp_dir(), &format!("{slug}-{chapter_id}-"))
    }

    pub fn create_in(parent: &Path, prefix: &str) -> io::Result<Self> {
        fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new().prefix(prefix).tempdir_in(parent)?;
        let path = dir.keep();
        exporter_debug!("Working directory created at {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Removes the directory and everything in it.
    pub fn release(self) -> io::Result<()> {
        exporter_debug!("Removing working directory {}", self.path.display());
        match fs::remove_dir_all(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_removes_contents() {
        let parent = tempfile::TempDir::new().unwrap();
        let dir = WorkingDirectory::create_in(parent.path(), "one-piece-1070-").unwrap();
        fs::write(dir.join("one-piece-1070-01.jpg"), b"x").unwrap();
        let path = dir.path().to_path_buf();
        assert!(path.starts_with(parent.path()));

        dir.release().unwrap();
        assert!(!path.exists());
    }
}
