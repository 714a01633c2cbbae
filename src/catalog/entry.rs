//! Classification and parsing of one candidate entry.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::record::Record;

use super::attributes::extract_attributes;
use super::error::CatalogError;
use super::segment::Strategy;

#[allow(clippy::expect_used)]
static IDENTIFIER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*\S)[ \t]+([0-9]+[A-Za-z]?)[ \t\r]*$").expect("identifier line regex is valid")
});

#[allow(clippy::expect_used)]
static IDENTIFIER_LINES_MULTILINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(.*\S)[ \t]+([0-9]+[A-Za-z]?)[ \t\r]*$")
        .expect("multiline identifier line regex is valid")
});

/// Result of parsing one candidate that did not hit a fatal inconsistency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The candidate is one catalog entry.
    Parsed(Record),
    /// Decorative separator text; not an entry.
    Skipped,
    /// No line carries an identifier.
    NoIdentifier,
    /// Several lines carry identifiers; the candidate likely bundles entries
    /// and should be re-segmented with the next strategy.
    Ambiguous {
        /// Number of identifier lines found
        occurrences: usize,
    },
}

/// Parses one candidate into a record or a recoverable outcome.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedEntry`] when identifier lines are counted
/// in the candidate but none can be located line by line.
pub fn parse_entry(
    candidate: &str,
    year: Option<u16>,
    strategy: Strategy,
) -> Result<EntryOutcome, CatalogError> {
    if is_separator(candidate) {
        return Ok(EntryOutcome::Skipped);
    }

    let occurrences = count_identifier_lines(candidate);
    if occurrences == 0 {
        return Ok(EntryOutcome::NoIdentifier);
    }
    if occurrences > 1 && strategy < Strategy::Line {
        return Ok(EntryOutcome::Ambiguous { occurrences });
    }

    let lines: Vec<&str> = candidate.lines().collect();
    let located = lines.iter().enumerate().find_map(|(index, line)| {
        IDENTIFIER_LINE.captures(line).and_then(|captures| {
            Some((index, captures.get(1)?.as_str(), captures.get(2)?.as_str()))
        })
    });
    let Some((id_index, title_fragment, identifier)) = located else {
        return Err(CatalogError::malformed(year.unwrap_or_default(), candidate));
    };

    let joined = lines
        .iter()
        .enumerate()
        .map(|(index, line)| if index == id_index { title_fragment } else { *line })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let attributes = extract_attributes(&joined);
    trace!(identifier, title = %attributes.title, "entry parsed");

    let record = Record::builder(identifier)
        .title(attributes.title)
        .author(attributes.author)
        .year(year)
        .extras(&attributes.extras)
        .build()
        .map_err(|_| CatalogError::malformed(year.unwrap_or_default(), candidate))?;

    Ok(EntryOutcome::Parsed(record))
}

/// Number of lines in `candidate` ending with an identifier.
#[must_use]
pub fn count_identifier_lines(candidate: &str) -> usize {
    IDENTIFIER_LINES_MULTILINE.find_iter(candidate).count()
}

/// True when every non-whitespace character is the same punctuation mark.
fn is_separator(candidate: &str) -> bool {
    let mut marks = candidate.chars().filter(|ch| !ch.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    first.is_ascii_punctuation() && marks.all(|ch| ch == first)
}
