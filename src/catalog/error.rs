//! Error types for catalog parsing.

use thiserror::Error;

use super::{END_MARKER, START_MARKER};

/// Maximum characters of an offending entry echoed back in error messages.
pub const MAX_CANDIDATE_PREVIEW: usize = 200;

/// Errors surfaced by the catalog pipeline.
///
/// Recoverable per-entry conditions (separator lines, entries without an
/// identifier, ambiguous entries) never appear here; they are
/// [`EntryOutcome`](super::EntryOutcome) variants handled inside the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The listings envelope markers were not found.
    #[error(
        "catalog listings envelope not found (expected '{}' ... '{}')\n  Suggestion: check that the input is a complete, unmodified catalog index",
        START_MARKER,
        END_MARKER
    )]
    MissingEnvelope,

    /// The envelope contains no year header lines.
    #[error(
        "no year headers found inside the catalog listings\n  Suggestion: year blocks must start with a 'GUTINDEX.<year>' header line"
    )]
    MissingYearHeaders,

    /// An entry's identifier line was counted but could not be located.
    #[error("malformed entry in year {year}: identifier line counted but not located: {candidate}")]
    MalformedEntry {
        /// Year of the block being parsed
        year: u16,
        /// Truncated entry text for diagnosis
        candidate: String,
    },
}

impl CatalogError {
    /// Creates a `MalformedEntry` error with a truncated candidate preview.
    #[must_use]
    pub fn malformed(year: u16, candidate: &str) -> Self {
        Self::MalformedEntry {
            year,
            candidate: candidate.chars().take(MAX_CANDIDATE_PREVIEW).collect(),
        }
    }

    /// Returns true for errors about the catalog's overall shape.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::MissingEnvelope | Self::MissingYearHeaders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_envelope_message_names_markers() {
        let msg = CatalogError::MissingEnvelope.to_string();
        assert!(msg.contains(START_MARKER));
        assert!(msg.contains(END_MARKER));
        assert!(msg.contains("Suggestion"));
    }

    #[test]
    fn test_malformed_truncates_candidate() {
        let long = "x".repeat(1000);
        let CatalogError::MalformedEntry { year, candidate } = CatalogError::malformed(1999, &long)
        else {
            panic!("expected MalformedEntry");
        };
        assert_eq!(year, 1999);
        assert_eq!(candidate.len(), MAX_CANDIDATE_PREVIEW);
    }

    #[test]
    fn test_format_error_classification() {
        assert!(CatalogError::MissingEnvelope.is_format_error());
        assert!(CatalogError::MissingYearHeaders.is_format_error());
        assert!(!CatalogError::malformed(2000, "x").is_format_error());
    }
}
