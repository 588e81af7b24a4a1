//! Crossprepare - prepare a build root for foreign-architecture builds.
//!
//! Copies the QEMU binfmt helpers into `{target-dir}/build/image-root` and
//! runs an init binary from a scoped temporary directory, so a later build
//! step can execute foreign binaries under QEMU user-mode emulation.

pub mod config;
pub mod emulator;
pub mod error;
pub mod layout;
pub mod preflight;
pub mod probe;
pub mod process;
pub mod task;
pub mod workspace;

pub use config::Config;
pub use emulator::{EmulatorBinaries, TargetArch};
pub use error::{ErrorKind, Result, TaskError};
pub use layout::BuildRootLayout;
pub use probe::{EnvironmentProbe, HostProbe, StaticProbe};
pub use process::{InitRunner, ProcessRunner};
pub use task::{CrossPrepareTask, HelpDisplay, TaskArguments, HELP_TOPIC};
pub use workspace::{ScopedInitWorkspace, WORKSPACE_PREFIX};
