//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`preview`] or [`validate`]. Each handler lives in
//! its own submodule.

pub mod preview;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::HttpLogError;

pub async fn dispatch(cli: Cli) -> Result<(), HttpLogError> {
    match cli.command {
        Some(Commands::Preview(args)) => preview::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  httplog v{version} \u{2014} template-driven HTTP request/response logging\n\n  \
         No command provided. To get started:\n\n    \
         httplog preview --preset short     Log a sample exchange\n    \
         httplog validate httplog.yaml      Check a config file\n    \
         httplog --help                     See all commands and options\n"
    );
}
