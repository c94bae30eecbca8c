use anyhow::Context;
use clap::Parser;
use ncr_cli::{Cli, load_settings, run};
use ncr_logger::Logger;
use ncr_search::ProcessEnvironment;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings =
        load_settings(cli.config.as_deref()).context("Critical: Configuration is malformed")?;

    let _log = Logger::from_settings(env!("CARGO_BIN_NAME"), &settings.logger)?;

    run(&cli, &settings, ProcessEnvironment, &mut std::io::stdout().lock())
}
