//! System command - prepares the emulated build root.

use anyhow::Result;

use crossprepare::{
    BuildRootLayout, Config, CrossPrepareTask, HelpDisplay, HostProbe, ProcessRunner,
    TaskArguments,
};

/// Execute `system crossprepare`.
pub fn cmd_crossprepare(
    args: &TaskArguments,
    config: &Config,
    help: &dyn HelpDisplay,
) -> Result<()> {
    let probe = HostProbe::new(&config.privileged_marker);
    let runner = ProcessRunner;
    let task = CrossPrepareTask::new(config, &probe, &runner, help);

    task.execute(args)?;

    if let Some(target_dir) = &args.target_dir {
        if !args.show_help {
            let layout = BuildRootLayout::new(target_dir);
            println!("Build root ready: {}", layout.root().display());
        }
    }
    Ok(())
}
