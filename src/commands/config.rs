//! Config command handler: show effective configuration.

use anyhow::Result;

use crate::app::config_manager::ResolvedConfig;
use crate::app::config_runtime;

pub fn run_config_show_command(resolved: &ResolvedConfig) -> Result<()> {
    let loaded_config = &resolved.loaded;
    let file_config = resolved.file_config();
    let fetch = config_runtime::resolve_fetch_config(None, file_config);

    let resolved_path = loaded_config.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded_config.loaded_from_file {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );
    println!(
        "catalog_path = {}",
        file_config
            .and_then(|cfg| cfg.catalog_path.as_ref())
            .map_or_else(|| "<unset>".to_string(), |path| path.display().to_string())
    );
    println!("mirror_url = {}", fetch.mirror_url);
    println!("fetch_connect_timeout_secs = {}", fetch.connect_timeout_secs);
    println!("fetch_read_timeout_secs = {}", fetch.read_timeout_secs);
    println!("fetch_max_retries = {}", fetch.retry.max_attempts());
    println!(
        "verbosity = {}",
        config_runtime::verbosity_label(&resolved.verbosity)
    );

    Ok(())
}
