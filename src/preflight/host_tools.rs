//! Emulator binary and init binary checks.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::emulator::EmulatorBinaries;
use crate::process::Cmd;

use super::types::CheckResult;

pub const CHECK_INIT: &str = "init binary";

/// Check every emulator binary exists. The emulator itself reports its version.
pub fn check_emulators(emulators: &EmulatorBinaries) -> Vec<CheckResult> {
    let mut results = Vec::new();
    let sources = emulators.sources();

    for (i, src) in sources.iter().enumerate() {
        let name = src.display().to_string();
        if !src.is_file() {
            results.push(CheckResult::fail(
                &name,
                "Not found. Install the qemu-linux-user package",
            ));
            continue;
        }

        // last entry is the plain emulator
        if i + 1 == sources.len() {
            match emulator_version(src) {
                Some(version) => results.push(CheckResult::pass_with(&name, &version)),
                None => results.push(CheckResult::pass(&name)),
            }
        } else {
            results.push(CheckResult::pass(&name));
        }
    }

    results
}

fn emulator_version(emulator: &Path) -> Option<String> {
    let result = Cmd::new(emulator).arg("--version").allow_fail().run().ok()?;
    if !result.success() {
        return None;
    }
    result
        .stdout_trimmed()
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}

/// Check the init binary is a regular file.
pub fn check_init_binary(init: &Path) -> CheckResult {
    match std::fs::metadata(init) {
        Ok(meta) if meta.is_file() => {
            if meta.permissions().mode() & 0o111 == 0 {
                CheckResult::warn(CHECK_INIT, "not executable (will be made executable when staged)")
            } else {
                CheckResult::pass_with(CHECK_INIT, &init.display().to_string())
            }
        }
        Ok(_) => CheckResult::fail(CHECK_INIT, &format!("{} is not a file", init.display())),
        Err(_) => CheckResult::fail(CHECK_INIT, &format!("{} not found", init.display())),
    }
}
