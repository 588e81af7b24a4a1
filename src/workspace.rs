//! Scoped temporary directory holding the init binary.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::emulator::copy_into;
use crate::error::{IoContext, Result};

/// Prefix of every init workspace directory.
pub const WORKSPACE_PREFIX: &str = "initvm_";

/// Temporary directory owned by one task invocation.
///
/// The directory and everything in it is removed when this value is dropped,
/// whether the invocation succeeded or not.
#[derive(Debug)]
pub struct ScopedInitWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScopedInitWorkspace {
    /// Create a workspace in the system temp dir, or under `parent` if given.
    pub fn new(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .io_context(|| "Failed to create init workspace")?;

        let path = dir.path().to_path_buf();
        tracing::debug!("Created init workspace {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy the init binary into the workspace and make it executable.
    ///
    /// Execute bits are added for owner, group and other; no other mode bits change.
    pub fn stage_init(&self, init_binary: &Path) -> Result<PathBuf> {
        let staged = copy_into(init_binary, &self.path)?;

        let mut perms = fs::metadata(&staged)
            .io_context(|| format!("Failed to stat {}", staged.display()))?
            .permissions();
        perms.set_mode(perms.mode() | 0o111);
        fs::set_permissions(&staged, perms)
            .io_context(|| format!("Failed to make {} executable", staged.display()))?;

        Ok(staged)
    }
}

impl Drop for ScopedInitWorkspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                tracing::warn!(
                    "Failed to remove init workspace {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}
