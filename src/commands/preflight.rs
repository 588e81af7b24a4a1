//! Preflight command - runs preflight checks.

use anyhow::{bail, Result};
use std::path::Path;

use crossprepare::preflight;
use crossprepare::{Config, HostProbe, TargetArch};

/// Execute the preflight command.
pub fn cmd_preflight(
    config: &Config,
    arch: &str,
    init: Option<&Path>,
    strict: bool,
) -> Result<()> {
    let arch = TargetArch::parse(arch)?;
    let probe = HostProbe::new(&config.privileged_marker);

    println!("Running preflight checks for {}...\n", arch);
    let report = preflight::run_preflight(config, &probe, &arch, init);
    report.print();

    if !report.all_passed() {
        if strict {
            bail!(
                "Preflight failed: {} check(s) failed. Fix the issues above before running crossprepare.",
                report.fail_count()
            );
        }
        println!("Some checks failed. Use --strict to fail with a non-zero exit code.");
    } else {
        println!("All preflight checks passed!");
    }
    Ok(())
}
