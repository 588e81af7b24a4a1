//! Shared test utilities for crossprepare tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crossprepare::{Config, HelpDisplay, InitRunner, TaskArguments, WORKSPACE_PREFIX};

/// Emulator files installed for `x86_64`, in install order.
pub const X86_64_EMULATORS: [&str; 3] = ["qemu-binfmt", "qemu-x86_64-binfmt", "qemu-x86_64"];

/// Test environment with a fake host and a target directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Stand-in for /usr/bin holding the QEMU helpers
    pub host_bin: PathBuf,
    /// Parent of the init workspaces
    pub tmp: PathBuf,
    /// --target-dir
    pub target_dir: PathBuf,
    /// Privileged container marker (absent unless created)
    pub marker: PathBuf,
    /// --init
    pub init: PathBuf,
    /// File the init script appends to when run
    pub init_log: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let host_bin = base.join("host/usr/bin");
        let tmp = base.join("tmp");
        let target_dir = base.join("data/target_dir");
        fs::create_dir_all(&host_bin).expect("Failed to create host bin dir");
        fs::create_dir_all(&tmp).expect("Failed to create tmp dir");

        Self {
            marker: base.join("host/.dockerenv.privileged"),
            init: base.join("qemu/binfmt/init"),
            init_log: base.join("init.log"),
            _temp_dir: temp_dir,
            host_bin,
            tmp,
            target_dir,
        }
    }

    pub fn config(&self) -> Config {
        Config::default()
            .with_host_bin_dir(&self.host_bin)
            .with_privileged_marker(&self.marker)
            .with_workspace_parent(&self.tmp)
    }

    /// Arguments for the `x86_64` scenario.
    pub fn args(&self) -> TaskArguments {
        TaskArguments {
            init_binary: Some(self.init.clone()),
            target_arch: Some("x86_64".to_string()),
            target_dir: Some(self.target_dir.clone()),
            allow_existing_root: false,
            show_help: false,
        }
    }

    /// Install fake QEMU helpers whose content is their own name.
    pub fn install_host_emulators(&self, names: &[&str]) {
        for name in names {
            create_mock_binary(&self.host_bin.join(name), &format!("#!/bin/sh\n# {}\n", name));
        }
    }

    /// Write an init script that logs `$0` and its argument count. Mode 0644 on purpose.
    pub fn write_init_script(&self, exit_code: i32) {
        let script = format!(
            "#!/bin/sh\necho \"$0 $#\" >> '{}'\nexit {}\n",
            self.init_log.display(),
            exit_code
        );
        fs::create_dir_all(self.init.parent().unwrap()).unwrap();
        fs::write(&self.init, script).expect("Failed to write init script");
        fs::set_permissions(&self.init, fs::Permissions::from_mode(0o644)).unwrap();
    }

    pub fn image_root(&self) -> PathBuf {
        self.target_dir.join("build/image-root")
    }

    /// Init workspaces still present under the tmp dir.
    pub fn leftover_workspaces(&self) -> Vec<PathBuf> {
        fs::read_dir(&self.tmp)
            .expect("Failed to read tmp dir")
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().starts_with(WORKSPACE_PREFIX))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Lines the init script logged, one per run.
    pub fn init_runs(&self) -> Vec<String> {
        fs::read_to_string(&self.init_log)
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Create a mock executable file.
pub fn create_mock_binary(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir for binary");
    }
    fs::write(path, content).expect("Failed to create mock binary");

    let mut perms = fs::metadata(path).expect("Failed to get metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("Failed to set permissions");
}

/// Runner that records calls and what the staged binary looked like at run time.
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: RefCell<Vec<StagedInit>>,
    pub fail: bool,
}

#[derive(Debug, Clone)]
pub struct StagedInit {
    pub path: PathBuf,
    pub existed: bool,
    pub mode: u32,
}

impl RecordingRunner {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl InitRunner for RecordingRunner {
    fn run_init(&self, program: &Path) -> crossprepare::Result<()> {
        let meta = fs::metadata(program).ok();
        self.calls.borrow_mut().push(StagedInit {
            path: program.to_path_buf(),
            existed: meta.is_some(),
            mode: meta.map(|m| m.permissions().mode() & 0o777).unwrap_or(0),
        });
        if self.fail {
            return Err(crossprepare::TaskError::CommandFailed {
                message: format!("Init binary {} failed", program.display()),
                code: 1,
            });
        }
        Ok(())
    }
}

/// Help display that counts how often it was asked.
#[derive(Default)]
pub struct CountingHelp {
    pub topics: RefCell<Vec<String>>,
}

impl HelpDisplay for CountingHelp {
    fn show(&self, topic: &str) {
        self.topics.borrow_mut().push(topic.to_string());
    }
}

/// Assert that a file exists with the given content.
pub fn assert_file_content(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
    assert_eq!(content, expected, "Unexpected content in {}", path.display());
}

/// Assert that a directory exists.
pub fn assert_dir_exists(path: &Path) {
    assert!(
        path.is_dir(),
        "Expected directory to exist: {}",
        path.display()
    );
}

/// Assert that a directory exists and is empty.
pub fn assert_dir_empty(path: &Path) {
    assert_dir_exists(path);
    let count = fs::read_dir(path).expect("Failed to read dir").count();
    assert_eq!(count, 0, "Expected {} to be empty", path.display());
}
