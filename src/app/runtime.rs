use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::app::{config_manager, config_runtime, terminal};
use crate::cli::{Cli, Command};
use crate::{ProcessExit, commands};

pub(crate) async fn run_gutindex() -> Result<ProcessExit> {
    // Parse before tracing so --help works without logs
    let cli = Cli::parse();
    let cli_sources = config_runtime::CliValueSources::from_cli(&cli);

    let resolved = config_manager::resolve_config(&cli, &cli_sources)?;

    let default_level = config_runtime::resolve_default_log_level(&resolved.verbosity);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    terminal::init_tracing(default_level, force_cli_log_level);

    debug!(?cli, config_loaded = resolved.loaded.loaded_from_file, "CLI arguments parsed");

    match &cli.command {
        Command::Parse(args) => commands::run_parse_command(args, &resolved),
        Command::Find(args) => commands::run_find_command(args, &resolved),
        Command::Sample(args) => commands::run_sample_command(args, &resolved),
        Command::Fetch(args) => commands::run_fetch_command(args, &resolved).await,
        Command::Config => {
            commands::run_config_show_command(&resolved)?;
            Ok(ProcessExit::Success)
        }
    }
}
