//! QEMU user-mode emulator binaries on the host.
//!
//! Three files are installed into the emulated root, always in this order:
//! 1. `qemu-binfmt` - generic binfmt registration helper
//! 2. `qemu-{arch}-binfmt` - architecture specific registration helper
//! 3. `qemu-{arch}` - the user-mode emulator itself

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, Result, TaskError};

/// Validated architecture identifier such as `x86_64` or `aarch64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetArch(String);

impl TargetArch {
    /// The name ends up in host paths, so only `[A-Za-z0-9_-]` is accepted.
    pub fn parse(arch: &str) -> Result<Self> {
        let arch = arch.trim();
        if arch.is_empty() {
            return Err(TaskError::InvalidArguments(
                "target architecture must not be empty".to_string(),
            ));
        }
        if let Some(bad) = arch
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(TaskError::InvalidArguments(format!(
                "invalid character '{}' in target architecture '{}'",
                bad, arch
            )));
        }
        Ok(Self(arch.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The host-side emulator files for one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorBinaries {
    sources: [PathBuf; 3],
}

impl EmulatorBinaries {
    pub fn for_arch(host_bin_dir: &Path, arch: &TargetArch) -> Self {
        Self {
            sources: [
                host_bin_dir.join("qemu-binfmt"),
                host_bin_dir.join(format!("qemu-{}-binfmt", arch)),
                host_bin_dir.join(format!("qemu-{}", arch)),
            ],
        }
    }

    /// Source paths in install order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Sources that are not regular files on the host.
    pub fn missing(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|p| !p.is_file())
            .map(PathBuf::as_path)
            .collect()
    }

    /// Fail unless every source exists. Partial presence counts as missing.
    pub fn ensure_present(&self) -> Result<()> {
        let missing = self.missing();
        match missing.as_slice() {
            [] => Ok(()),
            [only] => Err(TaskError::missing_file(*only, "QEMU emulator binary not found")),
            [first, rest @ ..] => {
                let others: Vec<String> = rest.iter().map(|p| p.display().to_string()).collect();
                Err(TaskError::missing_file(
                    *first,
                    format!(
                        "QEMU emulator binaries not found (also missing: {})",
                        others.join(", ")
                    ),
                ))
            }
        }
    }

    /// Copy every source into `bin_dir`, in order. Existing files are overwritten.
    pub fn install_into(&self, bin_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut installed = Vec::with_capacity(self.sources.len());
        for src in &self.sources {
            let dst = copy_into(src, bin_dir)?;
            tracing::debug!("Installed {} -> {}", src.display(), dst.display());
            installed.push(dst);
        }
        Ok(installed)
    }
}

/// Copy `src` into directory `dir`, keeping the file name and permission bits.
pub(crate) fn copy_into(src: &Path, dir: &Path) -> Result<PathBuf> {
    let name = src
        .file_name()
        .ok_or_else(|| TaskError::missing_file(src, "Path has no file name"))?;
    let dst = dir.join(name);
    fs::copy(src, &dst)
        .io_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
    Ok(dst)
}
