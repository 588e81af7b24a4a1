//! Configuration management for crossprepare.
//!
//! Reads configuration from a .env file and environment variables.
//! Environment variables take precedence over the .env file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Host directory holding the QEMU binfmt helpers.
pub const DEFAULT_HOST_BIN_DIR: &str = "/usr/bin";

/// Marker file present inside privileged docker containers.
pub const DEFAULT_PRIVILEGED_MARKER: &str = "/.dockerenv.privileged";

/// Mount point of the binfmt_misc filesystem.
pub const DEFAULT_BINFMT_MISC_DIR: &str = "/proc/sys/fs/binfmt_misc";

/// Crossprepare configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where `qemu-binfmt`, `qemu-{arch}-binfmt` and `qemu-{arch}` live (default: /usr/bin)
    pub host_bin_dir: PathBuf,
    /// Privileged container marker (default: /.dockerenv.privileged)
    pub privileged_marker: PathBuf,
    /// binfmt_misc mount, only inspected by preflight
    pub binfmt_misc_dir: PathBuf,
    /// Parent directory for the init workspace (default: system temp dir)
    pub workspace_parent: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host_bin_dir: PathBuf::from(DEFAULT_HOST_BIN_DIR),
            privileged_marker: PathBuf::from(DEFAULT_PRIVILEGED_MARKER),
            binfmt_misc_dir: PathBuf::from(DEFAULT_BINFMT_MISC_DIR),
            workspace_parent: None,
        }
    }
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment.
    pub fn load() -> Self {
        // A missing .env is the normal case.
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {}", e);
            }
        }
        // Non-UTF-8 entries are skipped.
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Self::from_vars(vars)
    }

    /// Build configuration from an explicit set of variables, falling back to defaults.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .filter(|(k, v)| k.starts_with("CROSSPREPARE_") && !v.trim().is_empty())
            .collect();
        let path_var = |key: &str| vars.get(key).map(|v| PathBuf::from(v.trim()));

        let defaults = Self::default();
        Self {
            host_bin_dir: path_var("CROSSPREPARE_HOST_BIN_DIR").unwrap_or(defaults.host_bin_dir),
            privileged_marker: path_var("CROSSPREPARE_PRIVILEGED_MARKER")
                .unwrap_or(defaults.privileged_marker),
            binfmt_misc_dir: path_var("CROSSPREPARE_BINFMT_MISC_DIR")
                .unwrap_or(defaults.binfmt_misc_dir),
            workspace_parent: path_var("CROSSPREPARE_TMPDIR"),
        }
    }

    /// Override the host binary directory.
    pub fn with_host_bin_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.host_bin_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Override the privileged container marker.
    pub fn with_privileged_marker(mut self, marker: impl AsRef<Path>) -> Self {
        self.privileged_marker = marker.as_ref().to_path_buf();
        self
    }

    /// Place the init workspace under `dir` instead of the system temp dir.
    pub fn with_workspace_parent(mut self, dir: impl AsRef<Path>) -> Self {
        self.workspace_parent = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  CROSSPREPARE_HOST_BIN_DIR: {}", self.host_bin_dir.display());
        println!(
            "  CROSSPREPARE_PRIVILEGED_MARKER: {}",
            self.privileged_marker.display()
        );
        println!(
            "  CROSSPREPARE_BINFMT_MISC_DIR: {}",
            self.binfmt_misc_dir.display()
        );
        match &self.workspace_parent {
            Some(dir) => println!("  CROSSPREPARE_TMPDIR: {}", dir.display()),
            None => println!("  CROSSPREPARE_TMPDIR: (system default)"),
        }
    }
}
