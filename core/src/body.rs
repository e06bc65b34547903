//! Outgoing payload selection.

use crate::headers::CONTENT_TYPE;
use crate::http::{Headers, HttpMethod};
use crate::kv;
use crate::request::BodyInput;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The payload for one send and the content type it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBody {
    pub body: Option<String>,
    pub content_type: Option<&'static str>,
}

impl ResolvedBody {
    fn none() -> Self {
        Self {
            body: None,
            content_type: None,
        }
    }

    /// Set `Content-Type` unless `headers` already has that exact key.
    pub fn apply_content_type(&self, headers: &mut Headers) {
        if let Some(content_type) = self.content_type {
            if !headers.contains(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, content_type);
            }
        }
    }
}

/// Select the payload for `method`. GET never carries a body, and empty
/// text is no body at all; the default content type still applies.
pub fn resolve_body(method: HttpMethod, input: &BodyInput) -> ResolvedBody {
    if method == HttpMethod::Get {
        return ResolvedBody::none();
    }
    let mut resolved = match input {
        BodyInput::Json(text) => ResolvedBody {
            body: Some(text.clone()),
            content_type: Some(JSON_CONTENT_TYPE),
        },
        BodyInput::Raw(text) => ResolvedBody {
            body: Some(text.clone()),
            content_type: None,
        },
        BodyInput::Form(rows) => ResolvedBody {
            body: Some(kv::form_encode(
                kv::active(rows).map(|row| (row.key.as_str(), row.value.as_str())),
            )),
            content_type: Some(FORM_CONTENT_TYPE),
        },
    };
    resolved.body = resolved.body.filter(|body| !body.is_empty());
    resolved
}
