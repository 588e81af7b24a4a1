//! Preflight checks for crossprepare.
//!
//! Reports whether the host can prepare a build root for an architecture,
//! without touching the target directory. Run with `crossprepare preflight`.

mod environment;
mod host_tools;
mod types;

use std::path::Path;

use crate::config::Config;
use crate::emulator::{EmulatorBinaries, TargetArch};
use crate::probe::EnvironmentProbe;

pub use environment::{CHECK_BINFMT_MISC, CHECK_CONTAINER};
pub use host_tools::CHECK_INIT;
pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks.
pub fn run_preflight(
    config: &Config,
    probe: &dyn EnvironmentProbe,
    arch: &TargetArch,
    init: Option<&Path>,
) -> PreflightReport {
    let mut report = PreflightReport::new(arch.clone());
    let checks = &mut report.checks;

    tracing::info!("Checking host environment");
    checks.push(environment::check_container(probe, &config.privileged_marker));
    checks.push(environment::check_binfmt_misc(&config.binfmt_misc_dir));

    tracing::info!("Checking {} emulator binaries", arch);
    let emulators = EmulatorBinaries::for_arch(&config.host_bin_dir, arch);
    checks.extend(host_tools::check_emulators(&emulators));

    if let Some(init) = init {
        checks.push(host_tools::check_init_binary(init));
    }

    report
}
