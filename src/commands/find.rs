//! Find command handler: query the catalog by attributes.

use anyhow::Result;
use gutindex_core::{MatchMode, Query};

use super::catalog::load_catalog;
use crate::ProcessExit;
use crate::app::config_manager::ResolvedConfig;
use crate::cli::FindArgs;

pub fn run_find_command(args: &FindArgs, resolved: &ResolvedConfig) -> Result<ProcessExit> {
    let loaded = load_catalog(args.catalog.as_deref(), resolved)?;
    let query = build_query(args);

    let matches = loaded.report.collection.find_all(&query);
    let mut records = matches.sorted();
    let total = records.len();
    if total == 0 {
        if !args.json {
            println!("No records matched {query}.");
        }
        return Ok(ProcessExit::Success);
    }

    let limit = args
        .limit
        .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
    let truncated = total > limit;
    records.truncate(limit);

    for record in &records {
        if args.json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            println!("{record}");
        }
    }

    if truncated && !args.json {
        println!(
            "Showing first {limit} of {total} matching records; rerun with a higher --limit to inspect more."
        );
    }

    Ok(ProcessExit::Success)
}

fn build_query(args: &FindArgs) -> Query {
    let mut query = Query::new()
        .maybe("title", args.title.as_deref())
        .maybe("author", args.author.as_deref())
        .maybe("language", args.language.as_deref())
        .maybe("year", args.year)
        .maybe("identifier", args.identifier.as_deref());
    for (key, value) in &args.attributes {
        query = query.with(key, value);
    }
    if args.exact {
        query = query.mode(MatchMode::Equals);
    } else if args.contains {
        query = query.mode(MatchMode::Contains);
    }
    query
}
