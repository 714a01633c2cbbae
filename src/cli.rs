//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Parse and query a GUTINDEX-style catalog of public-domain works.
///
/// gutindex turns the plain-text catalog into searchable records and can
/// fetch a cataloged work's text by identifier.
#[derive(Parser, Debug)]
#[command(name = "gutindex")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a catalog and print a summary of what was found
    Parse(ParseArgs),
    /// Find records matching attribute conditions
    Find(FindArgs),
    /// Print randomly chosen records
    Sample(SampleArgs),
    /// Fetch the text of cataloged works by identifier
    Fetch(FetchArgs),
    /// Show the effective configuration
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Catalog file (defaults to `catalog_path` from the config file)
    pub catalog: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FindArgs {
    /// Catalog file (defaults to `catalog_path` from the config file)
    pub catalog: Option<PathBuf>,

    /// Match on title (substring by default)
    #[arg(long)]
    pub title: Option<String>,

    /// Match on author (substring by default)
    #[arg(long)]
    pub author: Option<String>,

    /// Match on language
    #[arg(long)]
    pub language: Option<String>,

    /// Match on catalog year
    #[arg(long)]
    pub year: Option<u16>,

    /// Match on identifier
    #[arg(long = "id")]
    pub identifier: Option<String>,

    /// Match on any attribute, as key=value (repeatable)
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub attributes: Vec<(String, String)>,

    /// Require exact matches on every attribute
    #[arg(long, conflicts_with = "contains")]
    pub exact: bool,

    /// Use substring matches on every attribute
    #[arg(long)]
    pub contains: bool,

    /// Maximum records to print
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,

    /// Print records as JSON lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// Catalog file (defaults to `catalog_path` from the config file)
    pub catalog: Option<PathBuf>,

    /// Number of records to draw
    #[arg(short = 'n', long = "count", default_value_t = 1)]
    pub count: usize,

    /// Seed for a reproducible draw
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print records as JSON lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Identifiers to fetch
    #[arg(required = true, value_name = "ID")]
    pub identifiers: Vec<String>,

    /// Catalog used to label fetched works (optional)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Directory to write `<ID>.txt` files into (prints to stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep the license header and footer
    #[arg(long)]
    pub raw: bool,

    /// Mirror base URL (overrides `mirror_url` from the config file)
    #[arg(long)]
    pub mirror: Option<String>,

    /// Maximum retry attempts for transient failures (0-10)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: Option<u8>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected KEY=VALUE, got '{raw}'"));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing attribute name in '{raw}'"));
    }
    Ok((key.to_ascii_lowercase(), value.trim().to_string()))
}
