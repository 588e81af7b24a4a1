//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `system` - `system crossprepare`, prepare a cross-architecture build root
//! - `preflight` - Check the host without changing anything
//! - `show` - Display information

mod preflight;
pub mod show;
mod system;

pub use preflight::cmd_preflight;
pub use show::cmd_show;
pub use system::cmd_crossprepare;
