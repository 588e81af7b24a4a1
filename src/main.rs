//! Crossprepare - cross-architecture build root preparation.
//!
//! Installs the QEMU binfmt helpers into an image build root and runs the
//! init binary, so the next build step can execute foreign binaries.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crossprepare::{Config, HelpDisplay, TaskArguments, TaskError};

#[derive(Parser)]
#[command(name = "crossprepare")]
#[command(about = "Prepare a build root for QEMU binfmt emulation")]
#[command(
    after_help = "QUICK START:\n  crossprepare preflight --target-arch aarch64   Check the host\n  crossprepare system crossprepare --init ./init --target-arch aarch64 --target-dir ./target"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// System build root tasks
    System {
        #[command(subcommand)]
        command: SystemCommand,
    },

    /// Run preflight checks (verify the host before crossprepare)
    Preflight {
        /// Architecture to check emulator binaries for
        #[arg(long)]
        target_arch: String,
        /// Init binary to check
        #[arg(long, value_name = "PATH")]
        init: Option<PathBuf>,
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },
}

#[derive(Subcommand)]
enum SystemCommand {
    /// Prepare a cross-architecture build root
    #[command(disable_help_flag = true)]
    Crossprepare(CrossprepareArgs),
}

#[derive(clap::Args)]
struct CrossprepareArgs {
    /// Statically linked init binary to run inside the temporary workspace
    #[arg(long, value_name = "PATH", required_unless_present = "help")]
    init: Option<PathBuf>,

    /// Target architecture, e.g. x86_64 or aarch64
    #[arg(long, value_name = "ARCH", required_unless_present = "help")]
    target_arch: Option<String>,

    /// Build directory; the emulated root is TARGET_DIR/build/image-root
    #[arg(long, value_name = "PATH", required_unless_present = "help")]
    target_dir: Option<PathBuf>,

    /// Reuse an existing image-root instead of failing
    #[arg(long)]
    allow_existing_root: bool,

    /// Show this help
    #[arg(long)]
    help: bool,
}

impl From<CrossprepareArgs> for TaskArguments {
    fn from(args: CrossprepareArgs) -> Self {
        Self {
            init_binary: args.init,
            target_arch: args.target_arch,
            target_dir: args.target_dir,
            allow_existing_root: args.allow_existing_root,
            show_help: args.help,
        }
    }
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
}

/// Prints clap's long help for a `::`-separated topic such as
/// `crossprepare::system::crossprepare`.
struct ClapHelp;

impl HelpDisplay for ClapHelp {
    fn show(&self, topic: &str) {
        let mut current = Cli::command();
        for name in topic.split("::").skip(1) {
            let Some(sub) = current.find_subcommand(name).cloned() else {
                break;
            };
            current = sub;
        }
        if let Err(e) = current.print_long_help() {
            tracing::warn!("Failed to print help: {}", e);
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load();

    match cli.command {
        Commands::System {
            command: SystemCommand::Crossprepare(args),
        } => {
            commands::cmd_crossprepare(&args.into(), &config, &ClapHelp)?;
        }

        Commands::Preflight {
            target_arch,
            init,
            strict,
        } => {
            commands::cmd_preflight(&config, &target_arch, init.as_deref(), strict)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
            };
            commands::cmd_show(show_target, &config)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = err
                .downcast_ref::<TaskError>()
                .map(TaskError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}
