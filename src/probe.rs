//! Host environment detection.

use std::path::{Path, PathBuf};

/// Answers questions about the environment the task runs in.
///
/// binfmt registration is global to the host kernel, so the task refuses to
/// run where it cannot be set up reliably.
pub trait EnvironmentProbe {
    /// True when running inside a privileged container.
    fn is_privileged_container(&self) -> bool;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Clone)]
pub struct HostProbe {
    marker: PathBuf,
}

impl HostProbe {
    pub fn new(marker: impl Into<PathBuf>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &Path {
        &self.marker
    }
}

impl EnvironmentProbe for HostProbe {
    fn is_privileged_container(&self) -> bool {
        self.marker.is_file()
    }
}

/// Probe with a fixed answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticProbe {
    pub privileged_container: bool,
}

impl EnvironmentProbe for StaticProbe {
    fn is_privileged_container(&self) -> bool {
        self.privileged_container
    }
}
