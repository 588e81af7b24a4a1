//! Host environment checks (container, binfmt_misc).

use std::path::Path;

use crate::probe::EnvironmentProbe;

use super::types::CheckResult;

pub const CHECK_CONTAINER: &str = "privileged container";
pub const CHECK_BINFMT_MISC: &str = "binfmt_misc";

/// Check the process is not inside a privileged container.
pub fn check_container(probe: &dyn EnvironmentProbe, marker: &Path) -> CheckResult {
    if probe.is_privileged_container() {
        CheckResult::fail(
            CHECK_CONTAINER,
            &format!(
                "{} present - binfmt setup is unsupported here",
                marker.display()
            ),
        )
    } else {
        CheckResult::pass(CHECK_CONTAINER)
    }
}

/// Check binfmt_misc is mounted.
///
/// Only a warning: the init binary registers the interpreter and may mount it itself.
pub fn check_binfmt_misc(binfmt_misc_dir: &Path) -> CheckResult {
    let register = binfmt_misc_dir.join("register");
    if register.exists() {
        CheckResult::pass_with(CHECK_BINFMT_MISC, &binfmt_misc_dir.display().to_string())
    } else {
        CheckResult::warn(
            CHECK_BINFMT_MISC,
            &format!(
                "{} not found - is binfmt_misc mounted?",
                register.display()
            ),
        )
    }
}
