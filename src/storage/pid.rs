//! Process identity file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::StorageError;

/// Holds the server PID file for as long as it is alive.
///
/// The file is removed when the guard is dropped.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Write the current process id to `path`.
    pub fn create(path: PathBuf) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let pid = std::process::id();
        fs::write(&path, pid.to_string())?;
        info!("Wrote PID {} to {:?}", pid, path);
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!("Removed PID file {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove PID file {:?}: {}", self.path, e),
        }
    }
}
