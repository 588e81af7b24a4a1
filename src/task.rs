//! The `system crossprepare` task.
//!
//! Prepares `{target-dir}/build/image-root` so that a foreign-architecture
//! build can run under QEMU user-mode emulation:
//!
//! 1. refuse to run in a privileged container
//! 2. check the init binary and the existing root
//! 3. stage the init binary in an `initvm_` temp dir
//! 4. install the QEMU binfmt helpers into `usr/bin`, create `image/`
//! 5. run the staged init binary once
//!
//! All checks happen before the first filesystem change.

use std::path::PathBuf;

use crate::config::Config;
use crate::emulator::{EmulatorBinaries, TargetArch};
use crate::error::{IoContext, Result, TaskError};
use crate::layout::BuildRootLayout;
use crate::probe::EnvironmentProbe;
use crate::process::InitRunner;
use crate::workspace::ScopedInitWorkspace;

/// Help topic shown for `--help`.
pub const HELP_TOPIC: &str = "crossprepare::system::crossprepare";

/// Parsed command line of the task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskArguments {
    pub init_binary: Option<PathBuf>,
    pub target_arch: Option<String>,
    pub target_dir: Option<PathBuf>,
    pub allow_existing_root: bool,
    pub show_help: bool,
}

/// Displays usage text for a help topic.
pub trait HelpDisplay {
    fn show(&self, topic: &str);
}

/// Arguments with every required value present.
struct Resolved {
    init_binary: PathBuf,
    arch: TargetArch,
    layout: BuildRootLayout,
    allow_existing_root: bool,
}

impl TaskArguments {
    fn resolve(&self) -> Result<Resolved> {
        let init_binary = self
            .init_binary
            .clone()
            .ok_or_else(|| TaskError::InvalidArguments("--init is required".to_string()))?;
        let arch = self
            .target_arch
            .as_deref()
            .ok_or_else(|| TaskError::InvalidArguments("--target-arch is required".to_string()))
            .and_then(TargetArch::parse)?;
        let target_dir = self
            .target_dir
            .as_ref()
            .ok_or_else(|| TaskError::InvalidArguments("--target-dir is required".to_string()))?;

        Ok(Resolved {
            init_binary,
            arch,
            layout: BuildRootLayout::new(target_dir),
            allow_existing_root: self.allow_existing_root,
        })
    }
}

/// The cross-prepare task with its injected collaborators.
pub struct CrossPrepareTask<'a> {
    config: &'a Config,
    probe: &'a dyn EnvironmentProbe,
    runner: &'a dyn InitRunner,
    help: &'a dyn HelpDisplay,
}

impl<'a> CrossPrepareTask<'a> {
    pub fn new(
        config: &'a Config,
        probe: &'a dyn EnvironmentProbe,
        runner: &'a dyn InitRunner,
        help: &'a dyn HelpDisplay,
    ) -> Self {
        Self {
            config,
            probe,
            runner,
            help,
        }
    }

    /// Run the task. Every failure is terminal; nothing is retried.
    pub fn execute(&self, args: &TaskArguments) -> Result<()> {
        if args.show_help {
            self.help.show(HELP_TOPIC);
            return Ok(());
        }

        if self.probe.is_privileged_container() {
            return Err(TaskError::UnsupportedEnvironment(
                "binfmt setup is not supported inside a privileged container".to_string(),
            ));
        }

        let args = args.resolve()?;

        if !args.init_binary.is_file() {
            return Err(TaskError::missing_file(
                &args.init_binary,
                "Init binary not found",
            ));
        }

        let layout = &args.layout;
        if layout.root_exists() && !args.allow_existing_root {
            return Err(TaskError::RootAlreadyExists(layout.root().to_path_buf()));
        }

        let emulators = EmulatorBinaries::for_arch(&self.config.host_bin_dir, &args.arch);
        emulators.ensure_present()?;

        tracing::info!(
            "Preparing {} build root at {}",
            args.arch,
            layout.root().display()
        );

        let workspace = ScopedInitWorkspace::new(self.config.workspace_parent.as_deref())?;
        let init = workspace.stage_init(&args.init_binary)?;
        tracing::debug!("Staged init binary at {}", init.display());

        let bin_dir = layout.bin_dir();
        std::fs::create_dir_all(&bin_dir)
            .io_context(|| format!("Failed to create {}", bin_dir.display()))?;
        let installed = emulators.install_into(&bin_dir)?;
        tracing::info!(
            "Installed {} emulator binaries into {}",
            installed.len(),
            bin_dir.display()
        );

        let image_dir = layout.image_dir();
        std::fs::create_dir_all(&image_dir)
            .io_context(|| format!("Failed to create {}", image_dir.display()))?;

        tracing::info!("Running init binary {}", init.display());
        self.runner.run_init(&init)?;

        Ok(())
    }
}
