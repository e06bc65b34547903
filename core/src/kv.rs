//! Editable key/value rows for params, headers, and form bodies.
//!
//! Rows keep whatever the user typed, blank keys and duplicates included.
//! Composition only ever looks at the `active` rows.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// True when the key is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.key.trim().is_empty()
    }
}

/// The single blank row an empty editor starts with.
pub fn blank_rows() -> Vec<KeyValue> {
    vec![KeyValue::default()]
}

/// Rows with a non-blank key, in their original order.
pub fn active(rows: &[KeyValue]) -> impl Iterator<Item = &KeyValue> {
    rows.iter().filter(|row| !row.is_blank())
}

/// Encode pairs as `application/x-www-form-urlencoded` (`a=1&b=x+y`).
pub fn form_encode<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}
