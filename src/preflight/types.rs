//! Preflight check types and report.

use crate::emulator::TargetArch;

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    /// crossprepare will refuse to run or fail part way.
    Fail,
    /// Usable, but worth a look.
    Warn,
}

impl CheckStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Pass => "✓ [PASS]",
            Self::Fail => "✗ [FAIL]",
            Self::Warn => "⚠ [WARN]",
        }
    }
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, details: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            status,
            details: details.map(str::to_string),
        }
    }

    pub fn pass(name: &str) -> Self {
        Self::new(name, CheckStatus::Pass, None)
    }

    pub fn pass_with(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Pass, Some(details))
    }

    pub fn fail(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Fail, Some(details))
    }

    pub fn warn(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Warn, Some(details))
    }

    /// One report line, e.g. `✗ [FAIL] /usr/bin/qemu-x86_64: Not found`.
    pub fn line(&self) -> String {
        match &self.details {
            Some(details) => format!("{} {}: {}", self.status.label(), self.name, details),
            None => format!("{} {}", self.status.label(), self.name),
        }
    }
}

/// Preflight results for one target architecture.
#[derive(Debug)]
pub struct PreflightReport {
    pub arch: TargetArch,
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    pub fn new(arch: TargetArch) -> Self {
        Self {
            arch,
            checks: Vec::new(),
        }
    }

    /// True when `system crossprepare` can be expected to succeed for this arch.
    pub fn all_passed(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Failed checks, in report order.
    pub fn failed(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
    }

    pub fn fail_count(&self) -> usize {
        self.failed().count()
    }

    pub fn warn_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Warn)
            .count()
    }

    /// Look up a check by name.
    pub fn get(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("=== Preflight: {} ===\n", self.arch);
        for check in &self.checks {
            println!("  {}", check.line());
        }
        println!();

        let failed = self.fail_count();
        let warned = self.warn_count();
        println!(
            "Summary: {}/{} passed",
            self.checks.len() - failed - warned,
            self.checks.len()
        );
        if failed > 0 {
            println!(
                "         {} FAILED - crossprepare --target-arch {} will not succeed",
                failed, self.arch
            );
        }
        if warned > 0 {
            println!("         {} warnings", warned);
        }
    }
}
