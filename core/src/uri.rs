//! Final request URL composition.
//!
//! Pure string transforms: nothing here validates that the result is a
//! well-formed URL. Malformed URLs surface as transport failures at send time.

use crate::kv::{self, KeyValue};
use crate::request::{ApiKeyLocation, Auth};

/// An API key placed in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryApiKey<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> QueryApiKey<'a> {
    /// The query-placed key for `auth`, if it is an API key with location
    /// `query` and both a name and a value.
    pub fn from_auth(auth: Auth<'a>) -> Option<Self> {
        match auth {
            Auth::ApiKey(key) if key.location == ApiKeyLocation::Query => Some(QueryApiKey {
                name: key.name.trim(),
                value: &key.value,
            })
            .filter(QueryApiKey::is_usable),
            _ => None,
        }
    }

    fn is_usable(&self) -> bool {
        !self.name.trim().is_empty() && !self.value.trim().is_empty()
    }
}

/// Append the active params, then the query API key, to `base_url`.
///
/// Uses `&` when `base_url` already has a `?`. Returns `base_url` unchanged
/// when there is nothing to append.
pub fn compose_url(base_url: &str, params: &[KeyValue], api_key: Option<QueryApiKey<'_>>) -> String {
    let pairs = kv::active(params)
        .map(|row| (row.key.as_str(), row.value.as_str()))
        .chain(
            api_key
                .filter(QueryApiKey::is_usable)
                .map(|key| (key.name, key.value)),
        );
    let query = kv::form_encode(pairs);
    if query.is_empty() {
        return base_url.to_string();
    }
    let sep = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{sep}{query}")
}

/// Trim and drop one trailing `/`. Blank input yields an empty string.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

/// Resolve a user-entered path or URL against a collection base URL.
///
/// Absolute `http://`/`https://` input and an empty base both pass the
/// trimmed input through untouched.
pub fn resolve_url(path_or_url: &str, base_url: &str) -> String {
    let trimmed = path_or_url.trim();
    if base_url.is_empty() || trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_string();
    }
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    if trimmed.starts_with('/') {
        format!("{base}{trimmed}")
    } else {
        format!("{base}/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ApiKey;

    fn rows(pairs: &[(&str, &str)]) -> Vec<KeyValue> {
        pairs.iter().map(|(k, v)| KeyValue::new(*k, *v)).collect()
    }

    #[test]
    fn no_params_returns_base_unchanged() {
        assert_eq!(compose_url("https://a.com/x", &[], None), "https://a.com/x");
    }

    #[test]
    fn only_blank_rows_adds_no_question_mark() {
        let params = rows(&[("", "1"), ("  ", "2")]);
        assert_eq!(compose_url("https://a.com/x", &params, None), "https://a.com/x");
    }

    #[test]
    fn existing_query_uses_ampersand() {
        let params = rows(&[("z", "2")]);
        assert_eq!(
            compose_url("https://a.com/x?y=1", &params, None),
            "https://a.com/x?y=1&z=2"
        );
    }

    #[test]
    fn blank_keys_dropped_order_and_blank_values_kept() {
        let params = rows(&[("b", "2"), (" ", "skip"), ("a", ""), ("b", "3")]);
        assert_eq!(compose_url("http://h/p", &params, None), "http://h/p?b=2&a=&b=3");
    }

    #[test]
    fn api_key_goes_after_params() {
        let params = rows(&[("q", "rust lang")]);
        let key = QueryApiKey {
            name: "api_key",
            value: "s3cr&t",
        };
        assert_eq!(
            compose_url("http://h/p", &params, Some(key)),
            "http://h/p?q=rust+lang&api_key=s3cr%26t"
        );
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let key = QueryApiKey { name: "k", value: "  " };
        assert_eq!(compose_url("http://h/p", &[], Some(key)), "http://h/p");
        let key = QueryApiKey { name: " ", value: "v" };
        assert_eq!(compose_url("http://h/p", &[], Some(key)), "http://h/p");
    }

    #[test]
    fn composing_twice_is_identical() {
        let params = rows(&[("a", "1")]);
        assert_eq!(
            compose_url("http://h", &params, None),
            compose_url("http://h", &params, None)
        );
    }

    #[test]
    fn query_key_only_from_query_placement() {
        let mut key = ApiKey {
            name: " token ".to_string(),
            value: "v ".to_string(),
            location: ApiKeyLocation::Query,
        };
        assert_eq!(
            QueryApiKey::from_auth(Auth::ApiKey(&key)),
            Some(QueryApiKey {
                name: "token",
                value: "v "
            })
        );
        key.location = ApiKeyLocation::Header;
        assert_eq!(QueryApiKey::from_auth(Auth::ApiKey(&key)), None);
        assert_eq!(QueryApiKey::from_auth(Auth::Bearer { token: "t" }), None);
        assert_eq!(QueryApiKey::from_auth(Auth::None), None);
    }

    #[test]
    fn normalize_strips_one_trailing_slash() {
        assert_eq!(normalize_base_url("  https://api.dev/ "), "https://api.dev");
        assert_eq!(normalize_base_url("https://api.dev//"), "https://api.dev/");
        assert_eq!(normalize_base_url("   "), "");
    }

    #[test]
    fn resolve_joins_relative_paths() {
        assert_eq!(resolve_url("users", "https://api.dev"), "https://api.dev/users");
        assert_eq!(resolve_url(" /users ", "https://api.dev/"), "https://api.dev/users");
    }

    #[test]
    fn resolve_passes_absolute_urls_through() {
        assert_eq!(
            resolve_url("https://other.io/x", "https://api.dev"),
            "https://other.io/x"
        );
        assert_eq!(resolve_url("  users ", ""), "users");
    }
}
