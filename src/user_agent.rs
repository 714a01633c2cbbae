//! User-Agent string for fetch requests.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/gutindex";

/// Default User-Agent for fetch requests (identifies the tool).
#[must_use]
pub(crate) fn default_fetch_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("gutindex/{version} (catalog-tool; +{PROJECT_UA_URL})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_contains_version_and_project_url() {
        let ua = default_fetch_user_agent();
        assert!(ua.contains(PROJECT_UA_URL));
        assert_eq!(
            Some(env!("CARGO_PKG_VERSION")),
            ua.strip_prefix("gutindex/")
                .and_then(|rest| rest.split(' ').next())
        );
    }
}
