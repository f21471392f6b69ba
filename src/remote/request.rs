//! Request builders for the catalog endpoints.
//!
//! Pure functions turning a query and configuration into fully-formed URLs.
//! No state, no I/O.

use reqwest::Url;

use super::RemoteError;

/// Search result part requested from the catalog.
const SEARCH_PART: &str = "snippet";

/// Item type requested from the catalog.
const SEARCH_TYPE: &str = "video";

/// Builds the search URL for a query.
///
/// The API key parameter is attached only when a key is configured.
pub fn search_url(
    endpoint: &str,
    query: &str,
    max_results: u32,
    api_key: &str,
) -> Result<Url, RemoteError> {
    assert!(!query.trim().is_empty(), "query must be validated upstream");

    let max = max_results.to_string();
    let mut params = vec![
        ("part", SEARCH_PART),
        ("type", SEARCH_TYPE),
        ("maxResults", max.as_str()),
        ("q", query),
    ];
    if !api_key.is_empty() {
        params.push(("key", api_key));
    }

    Url::parse_with_params(endpoint, params).map_err(|e| RemoteError::Url(e.to_string()))
}

/// Builds the update-check URL. No parameters.
pub fn update_check_url(endpoint: &str) -> Result<Url, RemoteError> {
    Url::parse(endpoint).map_err(|e| RemoteError::Url(e.to_string()))
}
