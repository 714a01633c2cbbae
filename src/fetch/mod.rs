//! Fetch-by-identifier: retrieve a cataloged work's plain text.
//!
//! Retrieval URLs are built from a mirror base and the record identifier
//! using two fixed templates, tried in order:
//!
//! - `{mirror}/files/{id}/{id}-0.txt`
//! - `{mirror}/files/{id}/{id}.txt`
//!
//! Transient failures are retried per URL under a bounded [`RetryPolicy`];
//! a 404 moves on to the next template. Nothing is cached.

mod error;
mod retry;

pub use error::FetchError;
pub use retry::{DEFAULT_MAX_RETRIES, FailureType, RetryDecision, RetryPolicy, classify_error};

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::record::Record;
use crate::user_agent;

/// Default mirror for retrieval URLs.
pub const DEFAULT_MIRROR_URL: &str = "https://www.gutenberg.org";

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout in seconds.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

#[allow(clippy::expect_used)]
static FETCH_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+[A-Za-z]?$").expect("fetch identifier regex is valid")
});

#[allow(clippy::expect_used)]
static BODY_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\*\*\*\s*START\b.*\*\*\*[ \t\r]*$").expect("body start regex is valid")
});

#[allow(clippy::expect_used)]
static BODY_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\*\*\*\s*END\b.*\*\*\*[ \t\r]*$").expect("body end regex is valid")
});

/// Settings for [`FetchClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    /// Base URL the retrieval templates are appended to.
    pub mirror_url: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mirror_url: DEFAULT_MIRROR_URL.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }
}

/// A fetched work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedText {
    pub identifier: String,
    /// The URL that served the text.
    pub url: Url,
    /// Full response body.
    pub text: String,
}

impl FetchedText {
    /// The work's body without the license header and footer, or the full
    /// text when the markers are absent.
    #[must_use]
    pub fn body(&self) -> &str {
        extract_book_body(&self.text).unwrap_or(&self.text)
    }
}

/// Validates a mirror base URL.
///
/// # Errors
///
/// Returns [`FetchError::InvalidMirror`] for unparsable or non-http(s) URLs.
pub fn parse_mirror_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|err| FetchError::InvalidMirror {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidMirror {
            url: raw.to_string(),
            reason: format!("scheme '{}' is not supported", url.scheme()),
        });
    }
    Ok(url)
}

/// Builds the two retrieval URLs for an identifier, in the order tried.
///
/// # Errors
///
/// Returns [`FetchError::InvalidIdentifier`] for identifiers that are not
/// digits with an optional letter suffix.
pub fn retrieval_urls(mirror: &Url, identifier: &str) -> Result<[Url; 2], FetchError> {
    let identifier = identifier.trim();
    if !FETCH_IDENTIFIER.is_match(identifier) {
        return Err(FetchError::InvalidIdentifier {
            identifier: identifier.to_string(),
        });
    }

    let base = mirror.as_str().trim_end_matches('/');
    let build = |file: String| {
        let raw = format!("{base}/files/{identifier}/{file}");
        Url::parse(&raw).map_err(|err| FetchError::InvalidMirror {
            url: mirror.to_string(),
            reason: err.to_string(),
        })
    };
    Ok([
        build(format!("{identifier}-0.txt"))?,
        build(format!("{identifier}.txt"))?,
    ])
}

/// Returns the text between the `*** START ... ***` and `*** END ... ***`
/// marker lines, trimmed.
#[must_use]
pub fn extract_book_body(text: &str) -> Option<&str> {
    let start = BODY_START.find(text)?;
    let rest = &text[start.end()..];
    let end = BODY_END.find(rest)?;
    Some(rest[..end.start()].trim())
}

/// HTTP client for retrieving works by identifier.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    mirror: Url,
    retry: RetryPolicy,
}

impl FetchClient {
    /// Builds a client from settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] for an invalid mirror or when the HTTP client
    /// cannot be constructed.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mirror = parse_mirror_url(&config.mirror_url)?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .user_agent(user_agent::default_fetch_user_agent())
            .gzip(true)
            .build()
            .map_err(|source| FetchError::Client { source })?;
        Ok(Self {
            client,
            mirror,
            retry: config.retry.clone(),
        })
    }

    #[must_use]
    pub fn mirror(&self) -> &Url {
        &self.mirror
    }

    /// Fetches the text for a record.
    ///
    /// # Errors
    ///
    /// See [`FetchClient::fetch_text`].
    pub async fn fetch_record(&self, record: &Record) -> Result<FetchedText, FetchError> {
        self.fetch_text(record.identifier()).await
    }

    /// Fetches the text for an identifier, trying each retrieval URL in turn.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotFound`] when every URL answers 404, or the
    /// first non-404 failure once its retries are exhausted.
    #[instrument(skip(self), fields(mirror = %self.mirror))]
    pub async fn fetch_text(&self, identifier: &str) -> Result<FetchedText, FetchError> {
        let urls = retrieval_urls(&self.mirror, identifier)?;

        for url in &urls {
            match self.get_with_retry(url).await {
                Ok(text) => {
                    info!(url = %url, bytes = text.len(), "fetched text");
                    return Ok(FetchedText {
                        identifier: identifier.trim().to_string(),
                        url: url.clone(),
                        text,
                    });
                }
                Err(err) if err.status() == Some(StatusCode::NOT_FOUND.as_u16()) => {
                    debug!(url = %url, "not found; trying next template");
                }
                Err(err) => return Err(err),
            }
        }

        Err(FetchError::NotFound {
            identifier: identifier.trim().to_string(),
            tried: urls
                .iter()
                .map(Url::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    async fn get_with_retry(&self, url: &Url) -> Result<String, FetchError> {
        let mut attempt = 1;
        loop {
            let err = match self.get_once(url).await {
                Ok(text) => return Ok(text),
                Err(err) => err,
            };
            match self.retry.should_retry(classify_error(&err), attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next,
                } => {
                    warn!(url = %url, error = %err, attempt, delay_ms = delay.as_millis(), "fetch failed; retrying");
                    tokio::time::sleep(delay).await;
                    attempt = next;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(url = %url, error = %err, reason, "giving up on URL");
                    return Err(err);
                }
            }
        }
    }

    async fn get_once(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::from_reqwest(url.as_str(), source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| FetchError::from_reqwest(url.as_str(), source))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_urls_follow_templates() {
        let mirror = parse_mirror_url("https://www.gutenberg.org/").unwrap();
        let [first, second] = retrieval_urls(&mirror, "2600").unwrap();
        assert_eq!(first.as_str(), "https://www.gutenberg.org/files/2600/2600-0.txt");
        assert_eq!(second.as_str(), "https://www.gutenberg.org/files/2600/2600.txt");
    }

    #[test]
    fn test_retrieval_urls_keep_mirror_path_prefix() {
        let mirror = parse_mirror_url("http://mirror.example.org/gutenberg").unwrap();
        let [first, _] = retrieval_urls(&mirror, "11B").unwrap();
        assert_eq!(
            first.as_str(),
            "http://mirror.example.org/gutenberg/files/11B/11B-0.txt"
        );
    }

    #[test]
    fn test_retrieval_urls_reject_bad_identifier() {
        let mirror = parse_mirror_url(DEFAULT_MIRROR_URL).unwrap();
        let err = retrieval_urls(&mirror, "../etc").unwrap_err();
        assert!(matches!(err, FetchError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_retrieval_urls_reject_non_ascii_digits() {
        let mirror = parse_mirror_url(DEFAULT_MIRROR_URL).unwrap();
        let err = retrieval_urls(&mirror, "\u{661}\u{662}").unwrap_err();
        assert!(matches!(err, FetchError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_parse_mirror_url_rejects_ftp() {
        let err = parse_mirror_url("ftp://example.org").unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn test_extract_book_body_between_markers() {
        let text = "\
Header and license
*** START OF THE PROJECT GUTENBERG EBOOK WAR AND PEACE ***

Well, Prince, so Genoa and Lucca are now just family estates.

*** END OF THE PROJECT GUTENBERG EBOOK WAR AND PEACE ***
Footer";
        assert_eq!(
            extract_book_body(text),
            Some("Well, Prince, so Genoa and Lucca are now just family estates.")
        );
    }

    #[test]
    fn test_extract_book_body_without_markers() {
        assert!(extract_book_body("plain text").is_none());
    }

    #[test]
    fn test_fetched_text_body_falls_back_to_full_text() {
        let fetched = FetchedText {
            identifier: "1".to_string(),
            url: Url::parse("https://example.org/files/1/1.txt").unwrap(),
            text: "no markers".to_string(),
        };
        assert_eq!(fetched.body(), "no markers");
    }

    #[test]
    fn test_fetch_client_rejects_invalid_mirror() {
        let config = FetchConfig {
            mirror_url: "not a url".to_string(),
            ..FetchConfig::default()
        };
        assert!(matches!(
            FetchClient::new(&config),
            Err(FetchError::InvalidMirror { .. })
        ));
    }
}
