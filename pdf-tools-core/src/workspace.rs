//! Request-scoped temporary files
//!
//! A [`TempWorkspace`] owns every temporary path created while serving one
//! request. Paths are created exclusively (no two workspaces can ever hand out
//! the same name) and are all removed when the workspace is released, either
//! explicitly with [`TempWorkspace::release_all`] or implicitly on drop. Removal
//! is best-effort: a path that is already gone is not an error, and cleanup
//! never replaces the request's own result or error.

use crate::error::Result;
use crate::upload::Upload;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

const FILE_PREFIX: &str = "pdftools_";

/// Temporary files belonging to a single request
#[derive(Debug)]
pub struct TempWorkspace {
    dir: PathBuf,
    paths: Vec<TempPath>,
}

impl TempWorkspace {
    /// Workspace whose files live in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            paths: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Reserve a fresh, empty file ending in `suffix`
    pub fn allocate(&mut self, suffix: &str) -> Result<PathBuf> {
        let file = self.builder(suffix).tempfile_in(&self.dir)?;
        let path = file.into_temp_path();
        debug!(path = %path.display(), "Allocated temp path");
        Ok(self.track(path))
    }

    /// Write `bytes` to a fresh file ending in `suffix`.
    ///
    /// The path is only handed out once every byte is on disk; if the write
    /// fails the partial file is removed before the error is returned.
    pub fn persist(&mut self, bytes: &[u8], suffix: &str) -> Result<PathBuf> {
        let mut file = self.builder(suffix).tempfile_in(&self.dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        let path = file.into_temp_path();
        debug!(path = %path.display(), size = bytes.len(), "Persisted temp file");
        Ok(self.track(path))
    }

    /// Persist an upload, keeping the extension of its original filename
    pub fn persist_upload(&mut self, upload: &impl Upload) -> Result<PathBuf> {
        self.persist(upload.read(), &upload.extension())
    }

    /// Persist several uploads in order
    pub fn persist_uploads<'a, U: Upload + 'a>(
        &mut self,
        uploads: impl IntoIterator<Item = &'a U>,
    ) -> Result<Vec<PathBuf>> {
        uploads
            .into_iter()
            .map(|upload| self.persist_upload(upload))
            .collect()
    }

    /// Delete every owned path, ignoring failures
    pub fn release_all(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let count = self.paths.len();
        for path in self.paths.drain(..) {
            let shown = path.display().to_string();
            if let Err(e) = path.close() {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %shown, error = %e, "Failed to remove temp file");
                }
            }
        }
        if count > 0 {
            debug!(count, "Released temp workspace");
        }
    }

    fn builder<'a>(&self, suffix: &'a str) -> Builder<'static, 'a> {
        let mut builder = Builder::new();
        builder.prefix(FILE_PREFIX).suffix(suffix);
        builder
    }

    fn track(&mut self, path: TempPath) -> PathBuf {
        let owned = path.to_path_buf();
        self.paths.push(path);
        owned
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        self.release();
    }
}
