//! Turning a `FetchResult` into something a host can display.

use serde_json::Value;

use crate::dispatch::FetchResult;

/// How a response body should be shown.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyView {
    /// The body parsed as JSON.
    Json(Value),
    /// Show `FetchResult::body` as-is.
    Raw,
}

/// Parse `body` as JSON. Blank bodies are not parsed; parse failures fall
/// back to `Raw` silently.
pub fn interpret(body: &str) -> BodyView {
    if body.trim().is_empty() {
        return BodyView::Raw;
    }
    serde_json::from_str(body).map_or(BodyView::Raw, BodyView::Json)
}

/// Coarse bucket for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Redirect,
    Error,
    /// Transport failures (status 0) and informational codes.
    Unknown,
}

pub fn status_class(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        300..=399 => StatusClass::Redirect,
        400..=u16::MAX => StatusClass::Error,
        _ => StatusClass::Unknown,
    }
}

/// A fetch result together with its interpreted body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub result: FetchResult,
    pub view: BodyView,
}

impl From<FetchResult> for Response {
    fn from(result: FetchResult) -> Self {
        let view = interpret(&result.body);
        Self { result, view }
    }
}

impl Response {
    pub fn is_json(&self) -> bool {
        matches!(self.view, BodyView::Json(_))
    }

    pub fn json(&self) -> Option<&Value> {
        match &self.view {
            BodyView::Json(value) => Some(value),
            BodyView::Raw => None,
        }
    }

    pub fn status_class(&self) -> StatusClass {
        status_class(self.result.status)
    }

    /// The body text for copying, or `None` when there is nothing to copy.
    pub fn copy_text(&self) -> Option<&str> {
        Some(self.result.body.as_str()).filter(|body| !body.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::Headers;

    fn result(body: &str) -> FetchResult {
        FetchResult {
            status: 200,
            headers: Headers::new(),
            body: body.to_string(),
            elapsed_ms: 5,
            error: None,
        }
    }

    #[test]
    fn json_object_is_parsed() {
        assert_eq!(interpret(r#"{"a":1}"#), BodyView::Json(json!({"a": 1})));
    }

    #[test]
    fn scalars_are_json_too() {
        assert_eq!(interpret(" 42 "), BodyView::Json(json!(42)));
        assert_eq!(interpret("\"s\""), BodyView::Json(json!("s")));
    }

    #[test]
    fn non_json_falls_back_to_raw() {
        let response = Response::from(result("not json"));
        assert_eq!(response.view, BodyView::Raw);
        assert_eq!(response.result.body, "not json");
        assert!(response.json().is_none());
    }

    #[test]
    fn blank_body_is_raw() {
        assert_eq!(interpret(""), BodyView::Raw);
        assert_eq!(interpret(" \n\t"), BodyView::Raw);
    }

    #[test]
    fn trailing_garbage_is_not_json() {
        assert_eq!(interpret(r#"{"a":1} x"#), BodyView::Raw);
    }

    #[test]
    fn status_classes() {
        assert_eq!(status_class(204), StatusClass::Success);
        assert_eq!(status_class(301), StatusClass::Redirect);
        assert_eq!(status_class(404), StatusClass::Error);
        assert_eq!(status_class(503), StatusClass::Error);
        assert_eq!(status_class(0), StatusClass::Unknown);
        assert_eq!(status_class(101), StatusClass::Unknown);
    }

    #[test]
    fn copy_text_skips_empty_bodies() {
        assert_eq!(Response::from(result("")).copy_text(), None);
        assert_eq!(Response::from(result("hi")).copy_text(), Some("hi"));
    }
}
