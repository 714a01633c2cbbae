//! Fetch command handler: retrieve works' text by identifier.

use std::path::Path;

use anyhow::{Context, Result};
use gutindex_core::{Collection, FetchClient, FetchedText};
use tracing::{error, info, warn};

use super::catalog::load_catalog;
use crate::ProcessExit;
use crate::app::config_manager::ResolvedConfig;
use crate::app::config_runtime;
use crate::cli::FetchArgs;

pub async fn run_fetch_command(args: &FetchArgs, resolved: &ResolvedConfig) -> Result<ProcessExit> {
    let config = config_runtime::resolve_fetch_config(Some(args), resolved.file_config());
    let client = FetchClient::new(&config).context("Failed to set up fetch client")?;

    let catalog = if args.catalog.is_some() {
        Some(load_catalog(args.catalog.as_deref(), resolved)?.report.collection)
    } else {
        None
    };

    if let Some(dir) = &args.output {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory '{}'", dir.display()))?;
    }

    let mut completed = 0;
    let mut failed = 0;
    for identifier in &args.identifiers {
        if let Some(catalog) = &catalog {
            label_from_catalog(catalog, identifier);
        }

        match client.fetch_text(identifier).await {
            Ok(fetched) => {
                let text = if args.raw {
                    fetched.text.as_str()
                } else {
                    fetched.body()
                };
                emit(&fetched, text, args.output.as_deref()).await?;
                completed += 1;
            }
            Err(err) => {
                error!(identifier = %identifier, error = %err, "Fetch failed");
                eprintln!("{identifier}: {err}");
                failed += 1;
            }
        }
    }

    info!(completed, failed, "Fetch complete");
    Ok(fetch_outcome(completed, failed))
}

fn label_from_catalog(catalog: &Collection, identifier: &str) {
    match catalog.find_by_identifier(identifier) {
        Some(record) => info!(record = %record, "Fetching cataloged work"),
        None => warn!(identifier, "Identifier not found in catalog; fetching anyway"),
    }
}

async fn emit(fetched: &FetchedText, text: &str, output_dir: Option<&Path>) -> Result<()> {
    let Some(dir) = output_dir else {
        println!("{text}");
        return Ok(());
    };
    let path = dir.join(format!("{}.txt", fetched.identifier));
    tokio::fs::write(&path, text)
        .await
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    println!("{} -> {}", fetched.identifier, path.display());
    Ok(())
}

fn fetch_outcome(completed: usize, failed: usize) -> ProcessExit {
    match (completed, failed) {
        (_, 0) => ProcessExit::Success,
        (0, _) => ProcessExit::Failure,
        _ => ProcessExit::Partial,
    }
}
