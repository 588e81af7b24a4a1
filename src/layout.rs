//! Paths inside the emulated build root.

use std::path::{Path, PathBuf};

/// Directories derived from `--target-dir`. Computed, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRootLayout {
    root: PathBuf,
}

impl BuildRootLayout {
    pub fn new(target_dir: impl AsRef<Path>) -> Self {
        Self {
            root: target_dir.as_ref().join("build").join("image-root"),
        }
    }

    /// `{target-dir}/build/image-root`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/usr/bin`, where the emulator binaries are installed.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("usr").join("bin")
    }

    /// `{root}/image`, expected to exist by the downstream build step.
    pub fn image_dir(&self) -> PathBuf {
        self.root.join("image")
    }

    pub fn root_exists(&self) -> bool {
        self.root.is_dir()
    }
}
