//! Catalog record entity and attribute predicate evaluation.
//!
//! A [`Record`] is an immutable value object: a fixed set of core fields
//! (title, author, identifier, year, language) plus an open-ended map of
//! extra attributes harvested from bracketed `[name: value]` tags.
//!
//! Equality and hashing cover every field, so two records are the same set
//! member only when all attributes match exactly.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::collection::{MatchMode, Query};

/// Language assigned to records whose entry carries no `[Language: ...]` tag.
pub const DEFAULT_LANGUAGE: &str = "English";

#[allow(clippy::expect_used)]
static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+[A-Za-z]?$").expect("record identifier regex is valid")
});

/// Errors raised when building a record from parsed parts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Identifier is missing entirely.
    #[error("record identifier is empty")]
    EmptyIdentifier,

    /// Identifier is not digits with an optional single letter suffix.
    #[error("invalid record identifier '{identifier}': expected digits with an optional letter suffix")]
    InvalidIdentifier {
        /// The rejected identifier
        identifier: String,
    },
}

/// One structured catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    title: String,
    author: String,
    identifier: String,
    year: Option<u16>,
    language: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    extras: BTreeMap<String, String>,
}

impl Record {
    /// Starts building a record with the given identifier.
    #[must_use]
    pub fn builder(identifier: impl Into<String>) -> RecordBuilder {
        RecordBuilder::new(identifier)
    }

    /// Work title, with bracketed tags removed.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Author text; empty when the entry names none.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Catalog-unique identifier (e.g. `"1234"` or `"1234B"`).
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Year declared by the enclosing year header, if known.
    #[must_use]
    pub fn year(&self) -> Option<u16> {
        self.year
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Extra attributes keyed by lower-cased tag name.
    #[must_use]
    pub fn extras(&self) -> &BTreeMap<String, String> {
        &self.extras
    }

    /// Resolves an attribute by name.
    ///
    /// Core fields win over extra attributes. `year` resolves to `None` when
    /// the record has no year. Lookup is case-insensitive on the name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        let key = name.trim().to_lowercase();
        match key.as_str() {
            "title" => Some(Cow::Borrowed(self.title.as_str())),
            "author" => Some(Cow::Borrowed(self.author.as_str())),
            "identifier" => Some(Cow::Borrowed(self.identifier.as_str())),
            "language" => Some(Cow::Borrowed(self.language.as_str())),
            "year" => self.year.map(|year| Cow::Owned(year.to_string())),
            _ => self.extras.get(&key).map(|value| Cow::Borrowed(value.as_str())),
        }
    }

    /// Evaluates a query against this record.
    ///
    /// Every condition must hold. A condition on an attribute the record does
    /// not have fails.
    #[must_use]
    pub fn check(&self, query: &Query) -> bool {
        query.conditions().iter().all(|condition| {
            let Some(actual) = self.attribute(&condition.attribute) else {
                return false;
            };
            match query.mode_for(&condition.attribute) {
                MatchMode::Equals => actual == condition.value.as_str(),
                MatchMode::Contains => actual.contains(condition.value.as_str()),
            }
        })
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.identifier, self.title)?;
        if !self.author.is_empty() {
            write!(f, ", by {}", self.author)?;
        }
        if let Some(year) = self.year {
            write!(f, " ({year})")?;
        }
        if self.language != DEFAULT_LANGUAGE {
            write!(f, " [{}]", self.language)?;
        }
        Ok(())
    }
}

/// Builder that normalizes fields and enforces record invariants.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    identifier: String,
    title: String,
    author: String,
    year: Option<u16>,
    language: Option<String>,
    extras: BTreeMap<String, String>,
}

impl RecordBuilder {
    fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: String::new(),
            author: String::new(),
            year: None,
            language: None,
            extras: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    #[must_use]
    pub fn year(mut self, year: Option<u16>) -> Self {
        self.year = year;
        self
    }

    /// Overrides the default language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Adds one extra attribute.
    ///
    /// A `language` key sets the language field instead of the extras map.
    /// Later values for the same key overwrite earlier ones.
    #[must_use]
    pub fn extra(mut self, name: &str, value: &str) -> Self {
        let key = name.trim().to_lowercase();
        let value = value.trim().to_string();
        if key == "language" {
            self.language = Some(value);
        } else if !key.is_empty() {
            self.extras.insert(key, value);
        }
        self
    }

    /// Adds every pair from an iterator of extra attributes.
    #[must_use]
    pub fn extras<'a>(self, extras: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        extras
            .into_iter()
            .fold(self, |builder, (name, value)| builder.extra(name, value))
    }

    /// Validates the identifier and produces the record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] when the identifier is empty or is not digits
    /// with an optional single letter suffix.
    pub fn build(self) -> Result<Record, RecordError> {
        let identifier = self.identifier.trim().to_string();
        if identifier.is_empty() {
            return Err(RecordError::EmptyIdentifier);
        }
        if !IDENTIFIER_PATTERN.is_match(&identifier) {
            return Err(RecordError::InvalidIdentifier { identifier });
        }

        let language = self
            .language
            .map(|language| language.trim().to_string())
            .filter(|language| !language.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Record {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            identifier,
            year: self.year,
            language,
            extras: self.extras,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn sample_record() -> Record {
        Record::builder("1234")
            .title("War and Peace")
            .author("Leo Tolstoy")
            .year(Some(2001))
            .extra(" Subtitle ", " A Novel ")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_applies_default_language() {
        let record = sample_record();
        assert_eq!(record.language(), DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_builder_normalizes_extra_keys_and_values() {
        let record = sample_record();
        assert_eq!(record.extras().get("subtitle").map(String::as_str), Some("A Novel"));
    }

    #[test]
    fn test_builder_promotes_language_tag() {
        let record = Record::builder("55")
            .title("Les Misérables")
            .extra("Language", "French")
            .build()
            .unwrap();
        assert_eq!(record.language(), "French");
        assert!(record.extras().get("language").is_none());
    }

    #[test]
    fn test_builder_rejects_empty_identifier() {
        let err = Record::builder("  ").title("x").build().unwrap_err();
        assert_eq!(err, RecordError::EmptyIdentifier);
    }

    #[test]
    fn test_builder_rejects_malformed_identifier() {
        let err = Record::builder("12AB").build().unwrap_err();
        assert!(matches!(err, RecordError::InvalidIdentifier { .. }));
        assert!(err.to_string().contains("12AB"));
    }

    #[test]
    fn test_builder_rejects_non_ascii_digits() {
        let err = Record::builder("\u{661}\u{662}").build().unwrap_err();
        assert!(matches!(err, RecordError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_builder_accepts_letter_suffix() {
        let record = Record::builder("4321B").build().unwrap();
        assert_eq!(record.identifier(), "4321B");
    }

    #[test]
    fn test_attribute_resolves_core_and_extra_fields() {
        let record = sample_record();
        assert_eq!(record.attribute("title").as_deref(), Some("War and Peace"));
        assert_eq!(record.attribute("YEAR").as_deref(), Some("2001"));
        assert_eq!(record.attribute("subtitle").as_deref(), Some("A Novel"));
        assert!(record.attribute("illustrator").is_none());
    }

    #[test]
    fn test_attribute_year_absent_when_unset() {
        let record = Record::builder("9").build().unwrap();
        assert!(record.attribute("year").is_none());
    }

    #[test]
    fn test_check_uses_containment_for_title() {
        let record = sample_record();
        assert!(record.check(&Query::new().with("title", "War")));
        assert!(!record.check(&Query::new().with("title", "Peace and War")));
    }

    #[test]
    fn test_check_uses_equality_for_identifier() {
        let record = sample_record();
        assert!(record.check(&Query::new().with("identifier", "1234")));
        assert!(!record.check(&Query::new().with("identifier", "123")));
    }

    #[test]
    fn test_check_mode_override_applies_to_all_conditions() {
        let record = sample_record();
        let exact = Query::new().with("title", "War").mode(MatchMode::Equals);
        assert!(!record.check(&exact));

        let loose = Query::new().with("identifier", "23").mode(MatchMode::Contains);
        assert!(record.check(&loose));
    }

    #[test]
    fn test_check_fails_on_missing_attribute() {
        let record = sample_record();
        assert!(!record.check(&Query::new().with("illustrator", "Anyone")));
    }

    #[test]
    fn test_records_with_identical_fields_are_one_set_member() {
        let mut set = HashSet::new();
        assert!(set.insert(sample_record()));
        assert!(!set.insert(sample_record()));

        let other_year = Record::builder("1234")
            .title("War and Peace")
            .author("Leo Tolstoy")
            .year(Some(2002))
            .extra("subtitle", "A Novel")
            .build()
            .unwrap();
        assert!(set.insert(other_year));
    }

    #[test]
    fn test_display_includes_identifier_author_and_year() {
        let text = sample_record().to_string();
        assert_eq!(text, "[1234] War and Peace, by Leo Tolstoy (2001)");
    }
}
