//! Configuration lifecycle: load file config and merge CLI verbosity over it.

use anyhow::Result;

use crate::app::config_runtime::{self, CliValueSources, EffectiveVerbosity};
use crate::app_config::{LoadedConfig, load_default_file_config};
use crate::cli::Cli;

/// Resolved configuration bundle handed to command handlers.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedConfig {
    pub(crate) loaded: LoadedConfig,
    pub(crate) verbosity: EffectiveVerbosity,
}

impl ResolvedConfig {
    pub(crate) fn file_config(&self) -> Option<&crate::app_config::FileConfig> {
        self.loaded.config.as_ref()
    }
}

/// Load file config and merge CLI overrides.
pub(crate) fn resolve_config(cli: &Cli, cli_sources: &CliValueSources) -> Result<ResolvedConfig> {
    let loaded = load_default_file_config()?;
    let verbosity = config_runtime::resolve_verbosity(cli, cli_sources, loaded.config.as_ref());
    Ok(ResolvedConfig { loaded, verbosity })
}
