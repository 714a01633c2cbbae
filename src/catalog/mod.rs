//! Catalog pipeline: raw index text in, a [`Collection`] of records out.
//!
//! The pipeline strips the listings envelope, splits the listings into year
//! blocks at `GUTINDEX.<year>` header lines, removes each block's column
//! banner and `~ ~ ~ ~` annotation fences, then segments and parses entries.
//! A candidate that carries several identifiers is re-segmented at the next
//! [`Strategy`] level.
//!
//! # Example
//!
//! ```
//! use gutindex_core::catalog::parse_catalog;
//!
//! let raw = "\
//! <===LISTINGS===>
//! GUTINDEX.2001
//! TITLE and AUTHOR                                                   EBOOK NO.
//!
//! War and Peace, by Leo Tolstoy                                          2600
//!
//! <==End of GUTINDEX.ALL==>
//! ";
//!
//! let collection = parse_catalog(raw).unwrap();
//! let record = collection.find_by_identifier(2600).unwrap();
//! assert_eq!(record.author(), "Leo Tolstoy");
//! assert_eq!(record.year(), Some(2001));
//! ```

mod attributes;
mod entry;
mod error;
mod segment;

pub use attributes::{AUTHOR_SEPARATOR, EntryAttributes, extract_attributes};
pub use entry::{EntryOutcome, count_identifier_lines, parse_entry};
pub use error::{CatalogError, MAX_CANDIDATE_PREVIEW};
pub use segment::{Segmenter, Segments, Strategy, segment};

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::collection::Collection;
use crate::record::Record;

/// Marker opening the listings envelope.
pub const START_MARKER: &str = "<===LISTINGS===>";

/// Marker closing the listings envelope.
pub const END_MARKER: &str = "<==End of GUTINDEX.ALL==>";

/// Collection name used by [`parse_catalog`].
pub const DEFAULT_COLLECTION_NAME: &str = "GUTINDEX.ALL";

#[allow(clippy::expect_used)]
static ENVELOPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<===LISTINGS===>\r?\n?(.*)<==End of GUTINDEX\.ALL==>")
        .expect("catalog envelope regex is valid")
});

#[allow(clippy::expect_used)]
static YEAR_HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t=~]*GUTINDEX\.([0-9]{4})[ \t=~]*\r?$").expect("year header regex is valid")
});

#[allow(clippy::expect_used)]
static TITLE_BANNER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^TITLE\b.*$").expect("title banner regex is valid")
});

#[allow(clippy::expect_used)]
static ANNOTATION_FENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)~ ~ ~ ~.*?~ ~ ~ ~").expect("annotation fence regex is valid")
});

/// The text of one year, between its header and the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBlock<'a> {
    /// Year declared by the header line.
    pub year: u16,
    /// Raw block text, header excluded.
    pub text: &'a str,
}

/// Per-outcome counters for one catalog parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    /// Year blocks found.
    pub years: usize,
    /// Records produced by the entry parser (before de-duplication).
    pub parsed: usize,
    /// Parsed records identical to one already collected.
    pub duplicates: usize,
    /// Separator candidates dropped.
    pub skipped: usize,
    /// Candidates without an identifier line.
    pub no_identifier: usize,
    /// Ambiguous candidates re-segmented at a higher strategy level.
    pub escalations: usize,
    /// Ambiguous candidates dropped because no strategy level remained.
    pub exhausted: usize,
    /// Year blocks without a `TITLE` banner (yielding no entries).
    pub blocks_without_banner: usize,
    /// Year blocks aborted by a malformed entry.
    pub failed_blocks: usize,
}

impl CatalogSummary {
    /// One-line human summary.
    #[must_use]
    pub fn format_message(&self) -> String {
        format!(
            "Parsed {} records from {} years ({} duplicates, {} skipped, {} without identifier, {} escalated, {} failed blocks)",
            self.parsed - self.duplicates,
            self.years,
            self.duplicates,
            self.skipped,
            self.no_identifier,
            self.escalations,
            self.failed_blocks
        )
    }
}

/// A year block halted by a fatal entry error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFailure {
    pub year: u16,
    pub error: CatalogError,
}

/// Full outcome of [`parse_catalog_report`].
#[derive(Debug, Clone)]
pub struct CatalogReport {
    /// Records from every year block that completed.
    pub collection: Collection,
    pub summary: CatalogSummary,
    /// Year blocks that were aborted, in document order.
    pub failures: Vec<BlockFailure>,
}

impl CatalogReport {
    /// Converts into the collection, or the first block failure.
    ///
    /// # Errors
    ///
    /// Returns the first failed block's [`CatalogError`].
    pub fn into_collection(self) -> Result<Collection, CatalogError> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(self.collection),
        }
    }
}

/// Parses a whole catalog into a collection named [`DEFAULT_COLLECTION_NAME`].
///
/// # Errors
///
/// Returns a format error when the envelope or year headers are missing, and
/// [`CatalogError::MalformedEntry`] when any year block was aborted. Sibling
/// blocks are still parsed before the error is returned; use
/// [`parse_catalog_report`] to keep their records.
pub fn parse_catalog(raw: &str) -> Result<Collection, CatalogError> {
    parse_catalog_report(DEFAULT_COLLECTION_NAME, raw)?.into_collection()
}

/// Parses a whole catalog, reporting per-block failures alongside the records.
///
/// # Errors
///
/// Returns [`CatalogError::MissingEnvelope`] or
/// [`CatalogError::MissingYearHeaders`] when the catalog shape is unrecognized.
#[tracing::instrument(skip(raw), fields(input_len = raw.len()))]
pub fn parse_catalog_report(name: &str, raw: &str) -> Result<CatalogReport, CatalogError> {
    let envelope = listings_envelope(raw)?;
    let blocks = split_years(envelope);
    if blocks.is_empty() {
        return Err(CatalogError::MissingYearHeaders);
    }

    let mut collection = Collection::new(name);
    let mut summary = CatalogSummary {
        years: blocks.len(),
        ..CatalogSummary::default()
    };
    let mut failures = Vec::new();

    for block in blocks {
        let Some(cleaned) = clean_year_block(block.text) else {
            warn!(year = block.year, "year block has no TITLE banner; no entries taken");
            summary.blocks_without_banner += 1;
            continue;
        };

        let outcome = parse_block(&cleaned, block.year, Some(Strategy::Paragraph), &mut summary);
        absorb_block(
            block.year,
            outcome,
            &mut collection,
            &mut summary,
            &mut failures,
        );
    }

    info!(
        records = collection.len(),
        years = summary.years,
        skipped = summary.skipped,
        no_identifier = summary.no_identifier,
        escalations = summary.escalations,
        failed_blocks = summary.failed_blocks,
        "Catalog parsing complete"
    );

    Ok(CatalogReport {
        collection,
        summary,
        failures,
    })
}

/// Folds one year block's result into the running collection.
///
/// A failed block contributes no records; earlier and later blocks are kept.
fn absorb_block(
    year: u16,
    outcome: Result<Vec<Record>, CatalogError>,
    collection: &mut Collection,
    summary: &mut CatalogSummary,
    failures: &mut Vec<BlockFailure>,
) {
    match outcome {
        Ok(records) => {
            debug!(year, records = records.len(), "year block parsed");
            for record in records {
                summary.parsed += 1;
                if !collection.insert(record) {
                    summary.duplicates += 1;
                }
            }
        }
        Err(err) => {
            error!(year, error = %err, "year block aborted");
            summary.failed_blocks += 1;
            failures.push(BlockFailure { year, error: err });
        }
    }
}

/// Returns the listings text strictly between the envelope markers.
///
/// # Errors
///
/// Returns [`CatalogError::MissingEnvelope`] when either marker is absent.
pub fn listings_envelope(raw: &str) -> Result<&str, CatalogError> {
    ENVELOPE_PATTERN
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|listings| listings.as_str())
        .ok_or(CatalogError::MissingEnvelope)
}

/// Splits listings text into year blocks at header lines, in document order.
///
/// Text before the first header belongs to no year and is dropped.
#[must_use]
pub fn split_years(listings: &str) -> Vec<YearBlock<'_>> {
    let headers: Vec<(usize, usize, u16)> = YEAR_HEADER_PATTERN
        .captures_iter(listings)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let year = captures.get(1)?.as_str().parse().ok()?;
            Some((whole.start(), whole.end(), year))
        })
        .collect();

    headers
        .iter()
        .enumerate()
        .map(|(index, &(_, body_start, year))| {
            let body_end = headers
                .get(index + 1)
                .map_or(listings.len(), |&(next_start, _, _)| next_start);
            YearBlock {
                year,
                text: &listings[body_start..body_end],
            }
        })
        .collect()
}

/// Drops the column banner (and everything before it) and annotation fences.
///
/// Returns `None` when the block has no `TITLE` banner line.
#[must_use]
pub fn clean_year_block(text: &str) -> Option<String> {
    let banner = TITLE_BANNER_PATTERN.find(text)?;
    let body = &text[banner.end()..];
    Some(ANNOTATION_FENCE_PATTERN.replace_all(body, "").into_owned())
}

/// Segments and parses a cleaned year block starting at the paragraph strategy.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedEntry`] from the first malformed candidate.
pub fn parse_year_block(text: &str, year: u16) -> Result<Vec<Record>, CatalogError> {
    let mut summary = CatalogSummary::default();
    parse_block(text, year, Some(Strategy::Paragraph), &mut summary)
}

fn parse_block(
    text: &str,
    year: u16,
    strategy: Option<Strategy>,
    summary: &mut CatalogSummary,
) -> Result<Vec<Record>, CatalogError> {
    let Some(strategy) = strategy else {
        summary.exhausted += 1;
        debug!(year, "no segmentation strategy left; candidate dropped");
        return Ok(Vec::new());
    };

    let segmenter = Segmenter::new(text);
    let mut records = Vec::new();

    for candidate in segmenter.segments(strategy) {
        match parse_entry(candidate, Some(year), strategy)? {
            EntryOutcome::Parsed(record) => records.push(record),
            EntryOutcome::Skipped => summary.skipped += 1,
            EntryOutcome::NoIdentifier => {
                summary.no_identifier += 1;
                debug!(year, %strategy, candidate, "candidate has no identifier");
            }
            EntryOutcome::Ambiguous { occurrences } => {
                summary.escalations += 1;
                debug!(year, %strategy, occurrences, "ambiguous candidate; re-segmenting");
                records.extend(parse_block(candidate, year, strategy.escalate(), summary)?);
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn catalog(body: &str) -> String {
        format!("Preamble text\n{START_MARKER}\n{body}{END_MARKER}\nTrailer\n")
    }

    const YEAR_2001: &str = "\
GUTINDEX.2001
~ ~ ~ ~ Posting Dates for the below eBooks:  1 Dec 2001 to 31 Dec 2001 ~ ~ ~ ~

TITLE and AUTHOR                                                     EBOOK NO.

War and Peace, by Leo Tolstoy                                            2600

The Count of Monte Cristo, by Alexandre Dumas                            1184
 [Subtitle: Illustrated]

";

    #[test]
    fn test_listings_envelope_missing_markers() {
        assert_eq!(
            listings_envelope("no markers here"),
            Err(CatalogError::MissingEnvelope)
        );
        assert_eq!(
            listings_envelope(&format!("{START_MARKER}\nonly start")),
            Err(CatalogError::MissingEnvelope)
        );
    }

    #[test]
    fn test_listings_envelope_excludes_markers() {
        let raw = catalog("inside\n");
        assert_eq!(listings_envelope(&raw).unwrap(), "inside\n");
    }

    #[test]
    fn test_split_years_assigns_spans_in_order() {
        let listings = "junk\nGUTINDEX.2003\nthree\n== GUTINDEX.2002 ==\ntwo\n";
        let blocks = split_years(listings);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].year, 2003);
        assert_eq!(blocks[0].text, "\nthree\n");
        assert_eq!(blocks[1].year, 2002);
        assert_eq!(blocks[1].text, "\ntwo\n");
    }

    #[test]
    fn test_split_years_ignores_inline_mentions() {
        let blocks = split_years("see GUTINDEX.1999 for more\n");
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_clean_year_block_strips_banner_and_fences() {
        let cleaned = clean_year_block(
            "intro\nTITLE and AUTHOR   EBOOK NO.\nA 1\n~ ~ ~ ~ note\nspanning ~ ~ ~ ~\nB 2\n",
        )
        .unwrap();
        assert!(!cleaned.contains("intro"));
        assert!(!cleaned.contains("TITLE"));
        assert!(!cleaned.contains("note"));
        assert!(cleaned.contains("A 1"));
        assert!(cleaned.contains("B 2"));
    }

    #[test]
    fn test_clean_year_block_without_banner() {
        assert!(clean_year_block("A 1\nB 2\n").is_none());
    }

    #[test]
    fn test_parse_catalog_report_counts_records() {
        let report = parse_catalog_report("test", &catalog(YEAR_2001)).unwrap();
        assert_eq!(report.collection.len(), 2);
        assert_eq!(report.collection.name(), "test");
        assert_eq!(report.summary.years, 1);
        assert_eq!(report.summary.parsed, 2);
        assert!(report.failures.is_empty());

        let monte = report.collection.find_by_identifier("1184").unwrap();
        assert_eq!(monte.extras().get("subtitle").map(String::as_str), Some("Illustrated"));
    }

    #[test]
    fn test_parse_catalog_missing_year_headers() {
        let err = parse_catalog(&catalog("TITLE\nA, by B   1\n")).unwrap_err();
        assert_eq!(err, CatalogError::MissingYearHeaders);
    }

    #[test]
    fn test_parse_catalog_block_without_banner_yields_nothing() {
        let raw = catalog("GUTINDEX.2000\nA, by B       1\n\nGUTINDEX.1999\nTITLE\nC, by D    2\n");
        let report = parse_catalog_report("test", &raw).unwrap();
        assert_eq!(report.summary.blocks_without_banner, 1);
        assert_eq!(report.collection.len(), 1);
        assert_eq!(report.collection.iter().next().unwrap().year(), Some(1999));
    }

    #[test]
    fn test_parse_year_block_escalates_ambiguous_paragraph() {
        let block = "\
First, by A                               10
Second, by B                              11
 [Language: German]
Third, by C                               12

Fourth, by D                              13
";
        let mut records = parse_year_block(block, 2010).unwrap();
        records.sort_by(|a, b| a.identifier().cmp(b.identifier()));
        let ids: Vec<_> = records.iter().map(Record::identifier).collect();
        assert_eq!(ids, vec!["10", "11", "12", "13"]);
        assert_eq!(records[1].language(), "German");
    }

    #[test]
    fn test_parse_block_terminal_strategy_yields_nothing() {
        let mut summary = CatalogSummary::default();
        let records = parse_block("A, by B   1\n", 2000, None, &mut summary).unwrap();
        assert!(records.is_empty());
        assert_eq!(summary.exhausted, 1);
    }

    fn record(identifier: &str, year: u16) -> Record {
        Record::builder(identifier)
            .title(format!("Title {identifier}"))
            .year(Some(year))
            .build()
            .unwrap()
    }

    #[test]
    fn test_absorb_block_failure_keeps_sibling_years() {
        let mut collection = Collection::new("test");
        let mut summary = CatalogSummary::default();
        let mut failures = Vec::new();

        absorb_block(
            1999,
            Ok(vec![record("1", 1999), record("2", 1999)]),
            &mut collection,
            &mut summary,
            &mut failures,
        );
        absorb_block(
            2000,
            Err(CatalogError::malformed(2000, "Broken entry   7")),
            &mut collection,
            &mut summary,
            &mut failures,
        );
        absorb_block(
            2001,
            Ok(vec![record("3", 2001), record("1", 1999)]),
            &mut collection,
            &mut summary,
            &mut failures,
        );

        assert_eq!(collection.len(), 3);
        assert_eq!(summary.parsed, 4);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.failed_blocks, 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].year, 2000);
        assert!(matches!(
            failures[0].error,
            CatalogError::MalformedEntry { year: 2000, .. }
        ));
        assert!(summary.format_message().ends_with("1 failed blocks)"));
    }

    #[test]
    fn test_into_collection_returns_first_block_failure() {
        let mut collection = Collection::new("test");
        collection.insert(record("1", 1999));
        let report = CatalogReport {
            collection,
            summary: CatalogSummary {
                years: 3,
                parsed: 1,
                failed_blocks: 2,
                ..CatalogSummary::default()
            },
            failures: vec![
                BlockFailure {
                    year: 2000,
                    error: CatalogError::malformed(2000, "first"),
                },
                BlockFailure {
                    year: 2001,
                    error: CatalogError::malformed(2001, "second"),
                },
            ],
        };

        let err = report.into_collection().unwrap_err();
        assert_eq!(err, CatalogError::malformed(2000, "first"));
    }

    #[test]
    fn test_into_collection_without_failures() {
        let mut collection = Collection::new("test");
        collection.insert(record("1", 1999));
        let report = CatalogReport {
            collection,
            summary: CatalogSummary::default(),
            failures: Vec::new(),
        };
        assert_eq!(report.into_collection().unwrap().len(), 1);
    }

    #[test]
    fn test_summary_format_message() {
        let summary = CatalogSummary {
            years: 2,
            parsed: 5,
            duplicates: 1,
            ..CatalogSummary::default()
        };
        assert!(summary.format_message().starts_with("Parsed 4 records from 2 years"));
    }
}
