//! Request-scoped temporary file tracking and deferred removal.

use std::path::PathBuf;

/// Owns every temporary file created while serving one request.
///
/// Dropping the set removes each tracked file. Removal is best-effort:
/// failures are logged and never surfaced to the caller. The HTTP layer
/// moves the set into the response body stream so that removal runs only
/// once the body has been fully sent; on failure paths the set drops inside
/// the pipeline and the same cleanup applies.
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly created file for deferred removal.
    pub fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Paths tracked so far, in creation order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            if let Err(err) = std::fs::remove_file(&path) {
                tracing::debug!(
                    path = %path.display(),
                    error = %err,
                    "Failed to remove temporary file"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_removes_tracked_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = dir.path().join("a.mp3");
        let second = dir.path().join("b.mp3");
        std::fs::write(&first, b"one").expect("write");
        std::fs::write(&second, b"two").expect("write");

        let mut files = TempFiles::new();
        files.track(first.clone());
        files.track(second.clone());
        drop(files);

        assert!(!first.exists());
        assert!(!second.exists());
    }

    #[test]
    fn drop_tolerates_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut files = TempFiles::new();
        files.track(dir.path().join("never-created.mp3"));
        drop(files);
    }
}
