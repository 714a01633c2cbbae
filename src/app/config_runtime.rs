use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use gutindex_core::{DEFAULT_MAX_RETRIES, FetchConfig, RetryPolicy};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::{Cli, FetchArgs};

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

impl CliValueSources {
    pub(crate) fn from_cli(cli: &Cli) -> Self {
        Self {
            verbose: cli.verbose > 0,
            quiet: cli.quiet,
        }
    }
}

/// Verbosity after merging CLI flags over the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EffectiveVerbosity {
    pub(crate) verbose: u8,
    pub(crate) quiet: bool,
    pub(crate) debug: bool,
}

pub(crate) fn resolve_verbosity(
    cli: &Cli,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> EffectiveVerbosity {
    let mut effective = EffectiveVerbosity {
        verbose: cli.verbose,
        quiet: cli.quiet,
        debug: false,
    };
    if !cli_sources.verbose
        && !cli_sources.quiet
        && let Some(verbosity) = file_config.and_then(|cfg| cfg.verbosity)
    {
        apply_config_verbosity(&mut effective, verbosity);
    }
    effective
}

fn apply_config_verbosity(effective: &mut EffectiveVerbosity, verbosity: VerbositySetting) {
    match verbosity {
        VerbositySetting::Default => {
            effective.quiet = false;
            effective.debug = false;
            effective.verbose = 0;
        }
        VerbositySetting::Verbose => {
            effective.quiet = false;
            effective.debug = false;
            effective.verbose = 1;
        }
        VerbositySetting::Quiet => {
            effective.quiet = true;
            effective.debug = false;
            effective.verbose = 0;
        }
        VerbositySetting::Debug => {
            effective.quiet = false;
            effective.debug = true;
            effective.verbose = 0;
        }
    }
}

pub(crate) fn resolve_default_log_level(verbosity: &EffectiveVerbosity) -> &'static str {
    if verbosity.quiet {
        "error"
    } else if verbosity.debug {
        "trace"
    } else {
        match verbosity.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}

pub(crate) fn verbosity_label(verbosity: &EffectiveVerbosity) -> &'static str {
    if verbosity.debug {
        VerbositySetting::Debug.as_str()
    } else if verbosity.quiet {
        VerbositySetting::Quiet.as_str()
    } else if verbosity.verbose == 0 {
        VerbositySetting::Default.as_str()
    } else if verbosity.verbose == 1 {
        VerbositySetting::Verbose.as_str()
    } else {
        VerbositySetting::Debug.as_str()
    }
}

/// Picks the catalog from the command line, then the config file.
pub(crate) fn resolve_catalog_path(
    cli_path: Option<&Path>,
    file_config: Option<&FileConfig>,
) -> Result<PathBuf> {
    if let Some(path) = cli_path {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = file_config.and_then(|cfg| cfg.catalog_path.as_ref()) {
        return Ok(path.clone());
    }
    bail!(
        "No catalog file given\n  Suggestion: pass the catalog path, or set `catalog_path` in the config file (see `gutindex config`)"
    )
}

/// Merges fetch flags over config-file values over built-in defaults.
pub(crate) fn resolve_fetch_config(
    args: Option<&FetchArgs>,
    file_config: Option<&FileConfig>,
) -> FetchConfig {
    let mut config = FetchConfig::default();
    let mut max_retries = DEFAULT_MAX_RETRIES;

    if let Some(file_config) = file_config {
        if let Some(mirror_url) = &file_config.mirror_url {
            config.mirror_url.clone_from(mirror_url);
        }
        if let Some(value) = file_config.fetch_connect_timeout_secs {
            config.connect_timeout_secs = value;
        }
        if let Some(value) = file_config.fetch_read_timeout_secs {
            config.read_timeout_secs = value;
        }
        if let Some(value) = file_config.fetch_max_retries {
            max_retries = u32::from(value);
        }
    }

    if let Some(args) = args {
        if let Some(mirror_url) = &args.mirror {
            config.mirror_url.clone_from(mirror_url);
        }
        if let Some(value) = args.max_retries {
            max_retries = u32::from(value);
        }
    }

    config.retry = RetryPolicy::with_max_attempts(max_retries);
    config
}
