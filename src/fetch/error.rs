//! Error types for fetching catalog works.

use thiserror::Error;

/// Errors that can occur while fetching a work's text.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Identifier is not digits with an optional single letter suffix.
    #[error(
        "invalid identifier '{identifier}'\n  Suggestion: use a catalog number such as 2600 or 1234B"
    )]
    InvalidIdentifier {
        /// The rejected identifier
        identifier: String,
    },

    /// Mirror base URL is malformed or not http(s).
    #[error("invalid mirror URL '{url}': {reason}\n  Suggestion: use an http:// or https:// base URL")]
    InvalidMirror {
        /// The configured mirror
        url: String,
        /// Why the URL is invalid
        reason: String,
    },

    /// HTTP client construction failed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL being fetched
        url: String,
        /// The underlying network error
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out
        url: String,
    },

    /// Non-success HTTP status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// Every retrieval URL answered 404.
    #[error("no text available for identifier {identifier} (tried: {tried})")]
    NotFound {
        /// The identifier looked up
        identifier: String,
        /// Comma-separated URLs that were tried
        tried: String,
    },
}

impl FetchError {
    /// Wraps a reqwest error, separating timeouts from other network failures.
    #[must_use]
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source,
            }
        }
    }

    /// Returns the HTTP status for status errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
