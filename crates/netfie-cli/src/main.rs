//! Netfie command-line entry point.

use clap::Parser;
use netfie_cli::CliArgs;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = CliArgs::parse();
    log::debug!("{args:?}");
    netfie_cli::run(args)
}
