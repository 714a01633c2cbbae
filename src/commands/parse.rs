//! Parse command handler: parse a catalog and report what was found.

use anyhow::Result;
use gutindex_core::CatalogReport;
use serde_json::json;

use super::catalog::load_catalog;
use crate::ProcessExit;
use crate::app::config_manager::ResolvedConfig;
use crate::cli::ParseArgs;

pub fn run_parse_command(args: &ParseArgs, resolved: &ResolvedConfig) -> Result<ProcessExit> {
    let loaded = load_catalog(args.catalog.as_deref(), resolved)?;
    let report = &loaded.report;

    if args.json {
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|failure| json!({ "year": failure.year, "error": failure.error.to_string() }))
            .collect();
        let document = json!({
            "catalog": loaded.path.display().to_string(),
            "records": report.collection.len(),
            "summary": report.summary,
            "failures": failures,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        println!("{}", report.summary.format_message());
        for failure in &report.failures {
            println!("GUTINDEX.{}: {}", failure.year, failure.error);
        }
    }

    Ok(parse_outcome(report))
}

/// Failed year blocks make the run partial; the records of the others are still reported.
fn parse_outcome(report: &CatalogReport) -> ProcessExit {
    if report.failures.is_empty() {
        ProcessExit::Success
    } else {
        ProcessExit::Partial
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gutindex_core::catalog::{BlockFailure, CatalogSummary};
    use gutindex_core::{CatalogError, Collection, parse_catalog_report};

    use super::*;

    #[test]
    fn test_parse_outcome_success_without_failures() {
        let raw = "<===LISTINGS===>\nGUTINDEX.2001\nTITLE\nA, by B      1\n<==End of GUTINDEX.ALL==>\n";
        let report = parse_catalog_report("test", raw).unwrap();
        assert_eq!(parse_outcome(&report), ProcessExit::Success);
    }

    #[test]
    fn test_parse_outcome_partial_with_failed_block() {
        let report = CatalogReport {
            collection: Collection::new("test"),
            summary: CatalogSummary {
                years: 2,
                failed_blocks: 1,
                ..CatalogSummary::default()
            },
            failures: vec![BlockFailure {
                year: 2002,
                error: CatalogError::malformed(2002, "Broken   9"),
            }],
        };
        assert_eq!(parse_outcome(&report), ProcessExit::Partial);
    }
}
