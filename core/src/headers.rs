//! Request header composition.

use crate::http::Headers;
use crate::kv::{self, KeyValue};
use crate::request::{ApiKeyLocation, Auth};

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";

/// Merge explicit header rows with the headers derived from `auth`.
///
/// Keys are trimmed; a repeated key keeps its last value. Auth-derived
/// headers are applied after the rows and overwrite any explicit header
/// with the same key.
pub fn compose_headers(rows: &[KeyValue], auth: Auth<'_>) -> Headers {
    let mut headers: Headers = kv::active(rows)
        .map(|row| (row.key.trim(), row.value.as_str()))
        .collect();

    match auth {
        Auth::Bearer { token } if !token.trim().is_empty() => {
            headers.insert(AUTHORIZATION, format!("Bearer {}", token.trim()));
        }
        Auth::ApiKey(key)
            if key.location == ApiKeyLocation::Header
                && !key.name.trim().is_empty()
                && !key.value.is_empty() =>
        {
            headers.insert(key.name.trim(), key.value.as_str());
        }
        _ => {}
    }

    headers
}
