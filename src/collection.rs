//! Record collection with set semantics and an attribute query engine.
//!
//! # Example
//!
//! ```
//! use gutindex_core::{Collection, Query, Record};
//!
//! let mut collection = Collection::new("demo");
//! collection.insert(Record::builder("1234").title("War and Peace").build().unwrap());
//! collection.insert(Record::builder("99").title("Peace Talks").build().unwrap());
//!
//! let found = collection.find_all(&Query::new().with("title", "War"));
//! assert_eq!(found.len(), 1);
//! assert!(collection.find_by_identifier(1234).is_some());
//! assert!(collection.find_by_identifier("1").is_none());
//! ```

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use rand::seq::IteratorRandom;
use tracing::debug;

use crate::record::Record;

/// Attributes compared by substring containment unless a query overrides it.
const CONTAINS_BY_DEFAULT: &[&str] = &["title", "author", "subtitle"];

/// How a query condition compares the record value with the expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Values must be identical.
    Equals,
    /// The record value must contain the expected value.
    Contains,
}

impl MatchMode {
    /// Default comparison for an attribute name.
    #[must_use]
    pub fn default_for(attribute: &str) -> Self {
        if CONTAINS_BY_DEFAULT.contains(&attribute) {
            Self::Contains
        } else {
            Self::Equals
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::Contains => "~",
        }
    }
}

/// One `attribute <mode> value` condition inside a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Lower-cased attribute name.
    pub attribute: String,
    /// Expected value (already stringified).
    pub value: String,
}

/// Attribute predicate evaluated by [`Record::check`].
///
/// Conditions are combined with AND. With no override, each condition uses
/// [`MatchMode::default_for`] its attribute; [`Query::mode`] forces one mode
/// for the whole query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    conditions: Vec<Condition>,
    mode: Option<MatchMode>,
}

impl Query {
    /// Creates an empty query, which matches every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition. Values are compared as strings.
    #[must_use]
    pub fn with(mut self, attribute: &str, value: impl fmt::Display) -> Self {
        self.conditions.push(Condition {
            attribute: attribute.trim().to_lowercase(),
            value: value.to_string(),
        });
        self
    }

    /// Adds a condition only when a value is supplied.
    #[must_use]
    pub fn maybe<V: fmt::Display>(self, attribute: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(attribute, value),
            None => self,
        }
    }

    /// Overrides the comparison mode for every condition.
    #[must_use]
    pub fn mode(mut self, mode: MatchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Effective comparison mode for an attribute.
    #[must_use]
    pub fn mode_for(&self, attribute: &str) -> MatchMode {
        self.mode.unwrap_or_else(|| MatchMode::default_for(attribute))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            return write!(f, "*");
        }
        for (index, condition) in self.conditions.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            let symbol = self.mode_for(&condition.attribute).symbol();
            write!(f, "{}{}{}", condition.attribute, symbol, condition.value)?;
        }
        Ok(())
    }
}

/// Named, unordered set of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    name: String,
    records: HashSet<Record>,
}

impl Collection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: HashSet::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts a record. Returns `false` if an identical record was present.
    pub fn insert(&mut self, record: Record) -> bool {
        self.records.insert(record)
    }

    #[must_use]
    pub fn contains(&self, record: &Record) -> bool {
        self.records.contains(record)
    }

    /// Iterates records in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Records ordered by year, then numeric identifier, for stable output.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Record> {
        let mut records: Vec<&Record> = self.records.iter().collect();
        records.sort_by(|a, b| {
            a.year()
                .cmp(&b.year())
                .then_with(|| {
                    identifier_sort_key(a.identifier()).cmp(&identifier_sort_key(b.identifier()))
                })
                .then_with(|| a.title().cmp(b.title()))
        });
        records
    }

    /// Every record satisfying the query, as a new collection.
    #[tracing::instrument(skip(self, query), fields(collection = %self.name, query = %query))]
    #[must_use]
    pub fn find_all(&self, query: &Query) -> Collection {
        let records: HashSet<Record> = self
            .records
            .iter()
            .filter(|record| record.check(query))
            .cloned()
            .collect();
        debug!(matches = records.len(), "find_all complete");
        Collection {
            name: format!("{} [{query}]", self.name),
            records,
        }
    }

    /// Some record satisfying the query, or `None`.
    ///
    /// Iteration order is unspecified, so which match is returned is too.
    #[must_use]
    pub fn find_any(&self, query: &Query) -> Option<&Record> {
        self.records.iter().find(|record| record.check(query))
    }

    /// Exact identifier lookup. The identifier is compared as a string.
    #[must_use]
    pub fn find_by_identifier(&self, identifier: impl fmt::Display) -> Option<&Record> {
        let identifier = identifier.to_string();
        self.find_any(&Query::new().with("identifier", identifier.trim()))
    }

    /// Looks up several identifiers, keeping input order.
    pub fn find_by_identifiers<I, D>(&self, identifiers: I) -> Vec<Option<&Record>>
    where
        I: IntoIterator<Item = D>,
        D: fmt::Display,
    {
        identifiers
            .into_iter()
            .map(|identifier| self.find_by_identifier(identifier))
            .collect()
    }

    /// Uniform random sample without replacement, clamped to the collection size.
    #[must_use]
    pub fn sample(&self, n: usize) -> Vec<&Record> {
        self.sample_with(&mut rand::thread_rng(), n)
    }

    /// Single random record, or `None` when empty.
    #[must_use]
    pub fn sample_one(&self) -> Option<&Record> {
        self.records.iter().choose(&mut rand::thread_rng())
    }

    /// [`Collection::sample`] with a caller-supplied RNG.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<&Record> {
        let n = n.min(self.records.len());
        self.records.iter().choose_multiple(rng, n)
    }
}

impl Extend<Record> for Collection {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::collections::hash_set::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} records)", self.name, self.records.len())
    }
}

fn identifier_sort_key(identifier: &str) -> (u64, &str) {
    let digits_end = identifier
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(identifier.len());
    let number = identifier[..digits_end].parse().unwrap_or(u64::MAX);
    (number, &identifier[digits_end..])
}
