//! gutindex Core Library
//!
//! Parses a GUTINDEX-style plain-text catalog into an in-memory, queryable
//! [`Collection`] of [`Record`]s, and retrieves cataloged works by identifier.
//!
//! # Architecture
//!
//! - [`catalog`] - Catalog pipeline: envelope, year blocks, segmentation,
//!   entry parsing and attribute extraction
//! - [`record`] - Immutable record value type and its builder
//! - [`collection`] - Record set with attribute queries and sampling
//! - [`fetch`] - HTTP retrieval of a work's text with bounded retry

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod collection;
pub mod fetch;
pub mod record;
mod user_agent;

// Re-export commonly used types
pub use catalog::{
    CatalogError, CatalogReport, CatalogSummary, DEFAULT_COLLECTION_NAME, EntryOutcome, Strategy,
    parse_catalog, parse_catalog_report,
};
pub use collection::{Collection, MatchMode, Query};
pub use fetch::{
    DEFAULT_MAX_RETRIES, DEFAULT_MIRROR_URL, FetchClient, FetchConfig, FetchError, FetchedText,
    RetryPolicy, extract_book_body,
};
pub use record::{DEFAULT_LANGUAGE, Record, RecordBuilder, RecordError};
