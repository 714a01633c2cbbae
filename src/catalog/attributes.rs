//! Title, author and bracketed tag extraction for one joined entry line.
//!
//! Entry lines have the shape `title [tag: value] [tag: value], by author`,
//! where every part except the title is optional and tags may appear
//! anywhere in the line.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Separator between title and author. Titles may contain it too, so the
/// last occurrence wins.
pub const AUTHOR_SEPARATOR: &str = ", by ";

#[allow(clippy::expect_used)]
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\[\]:]+):(.*?)\]").expect("attribute tag regex is valid")
});

#[allow(clippy::expect_used)]
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace run regex is valid"));

/// Attributes extracted from an entry line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryAttributes {
    /// Title with tags removed.
    pub title: String,
    /// Author, empty when the line names none.
    pub author: String,
    /// Tag values keyed by lower-cased, trimmed tag name.
    pub extras: BTreeMap<String, String>,
}

impl EntryAttributes {
    /// Flattens into a single name → value map (`title`, `author`, then tags).
    ///
    /// Tags named `title` or `author` do not replace the parsed fields.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, String> {
        let mut map = self.extras;
        map.insert("title".to_string(), self.title);
        map.insert("author".to_string(), self.author);
        map
    }
}

/// Extracts title, author and tags from one entry line. Never fails.
#[must_use]
pub fn extract_attributes(line: &str) -> EntryAttributes {
    let stripped = TAG_PATTERN.replace_all(line, " ");
    let fragment = WHITESPACE_RUN.replace_all(stripped.trim(), " ");

    let (title, author) = match fragment.rsplit_once(AUTHOR_SEPARATOR) {
        Some((title, author)) => (title.trim(), author.trim()),
        None => (fragment.trim(), ""),
    };

    let extras = TAG_PATTERN
        .captures_iter(line)
        .filter_map(|captures| {
            let name = captures.get(1)?.as_str().trim().to_lowercase();
            let value = captures.get(2)?.as_str().trim().to_string();
            (!name.is_empty()).then_some((name, value))
        })
        .collect();

    EntryAttributes {
        title: title.to_string(),
        author: author.to_string(),
        extras,
    }
}
