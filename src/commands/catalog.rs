//! Shared catalog loading for the query commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gutindex_core::{CatalogReport, DEFAULT_COLLECTION_NAME, parse_catalog_report};
use tracing::{info, warn};

use crate::app::config_manager::ResolvedConfig;
use crate::app::config_runtime;

/// A parsed catalog and where it came from.
pub(crate) struct LoadedCatalog {
    pub(crate) path: PathBuf,
    pub(crate) report: CatalogReport,
}

/// Resolves the catalog path (CLI, then config) and parses it.
pub(crate) fn load_catalog(
    cli_path: Option<&Path>,
    resolved: &ResolvedConfig,
) -> Result<LoadedCatalog> {
    let path = config_runtime::resolve_catalog_path(cli_path, resolved.file_config())?;
    let report = read_and_parse(&path)?;
    Ok(LoadedCatalog { path, report })
}

fn read_and_parse(path: &Path) -> Result<CatalogReport> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read catalog '{}'", path.display()))?;
    let raw = String::from_utf8_lossy(&bytes);

    let name = path
        .file_name()
        .map_or_else(|| DEFAULT_COLLECTION_NAME.to_string(), |name| {
            name.to_string_lossy().into_owned()
        });
    let report = parse_catalog_report(&name, &raw)
        .with_context(|| format!("Failed to parse catalog '{}'", path.display()))?;

    for failure in &report.failures {
        warn!(year = failure.year, error = %failure.error, "Year block skipped");
    }
    info!(
        catalog = %path.display(),
        records = report.collection.len(),
        "Catalog loaded"
    );
    Ok(report)
}
