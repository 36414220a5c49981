//! ## flowmgr-cli
//! **Operator front end for the flow resource manager**
//!
//! Brings up the adapters named in the configuration, then either dumps
//! their resource tables or runs a multi-threaded allocation stress pass
//! against one of them.

use clap::Parser;

mod commands;
mod error;
mod stress;

use commands::Cli;
use error::CliError;

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    commands::run_command(cli)
}
