//! The user-editable request descriptor.
//!
//! # Design
//! The active body is a tagged union (`BodyInput`), so exactly one
//! representation is authoritative at send time. Input typed for the other
//! modes lives in `BodyDrafts` and is swapped back in by `switch_body_mode`.
//! Drafts only hold non-default input for inactive modes, which keeps the
//! descriptor and its stored row form in one-to-one correspondence.
//!
//! Auth keeps every credential field regardless of the active mode;
//! `AuthConfig::active` projects out the credentials that apply to a send.

use serde::{Deserialize, Serialize};

use crate::http::HttpMethod;
use crate::kv::{blank_rows, KeyValue};

pub const DEFAULT_JSON_BODY: &str = "{}";
pub const DEFAULT_API_KEY_NAME: &str = "X-Api-Key";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyMode {
    #[default]
    Json,
    Raw,
    Form,
}

impl BodyMode {
    pub const ALL: [BodyMode; 3] = [BodyMode::Json, BodyMode::Raw, BodyMode::Form];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyMode::Json => "json",
            BodyMode::Raw => "raw",
            BodyMode::Form => "form",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "json" => Some(BodyMode::Json),
            "raw" => Some(BodyMode::Raw),
            "form" => Some(BodyMode::Form),
            _ => None,
        }
    }
}

/// The body the user is editing, in exactly one mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "content", rename_all = "lowercase")]
pub enum BodyInput {
    /// JSON text, sent verbatim. Not validated before sending.
    Json(String),
    Raw(String),
    Form(Vec<KeyValue>),
}

impl Default for BodyInput {
    fn default() -> Self {
        BodyInput::empty(BodyMode::Json)
    }
}

impl BodyInput {
    /// What a fresh editor shows for `mode`.
    pub fn empty(mode: BodyMode) -> Self {
        match mode {
            BodyMode::Json => BodyInput::Json(DEFAULT_JSON_BODY.to_string()),
            BodyMode::Raw => BodyInput::Raw(String::new()),
            BodyMode::Form => BodyInput::Form(blank_rows()),
        }
    }

    pub fn mode(&self) -> BodyMode {
        match self {
            BodyInput::Json(_) => BodyMode::Json,
            BodyInput::Raw(_) => BodyMode::Raw,
            BodyInput::Form(_) => BodyMode::Form,
        }
    }

    fn is_empty_for_mode(&self) -> bool {
        *self == BodyInput::empty(self.mode())
    }
}

/// Bodies typed for modes that are not currently active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyDrafts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    form: Option<Vec<KeyValue>>,
}

impl BodyDrafts {
    pub(crate) fn stash(&mut self, body: BodyInput) {
        let keep = !body.is_empty_for_mode();
        match body {
            BodyInput::Json(text) => self.json = keep.then_some(text),
            BodyInput::Raw(text) => self.raw = keep.then_some(text),
            BodyInput::Form(rows) => self.form = keep.then_some(rows),
        }
    }

    fn take(&mut self, mode: BodyMode) -> BodyInput {
        let taken = match mode {
            BodyMode::Json => self.json.take().map(BodyInput::Json),
            BodyMode::Raw => self.raw.take().map(BodyInput::Raw),
            BodyMode::Form => self.form.take().map(BodyInput::Form),
        };
        taken.unwrap_or_else(|| BodyInput::empty(mode))
    }

    /// The draft for `mode`, or the empty body for it.
    pub fn peek(&self, mode: BodyMode) -> BodyInput {
        let draft = match mode {
            BodyMode::Json => self.json.clone().map(BodyInput::Json),
            BodyMode::Raw => self.raw.clone().map(BodyInput::Raw),
            BodyMode::Form => self.form.clone().map(BodyInput::Form),
        };
        draft.unwrap_or_else(|| BodyInput::empty(mode))
    }

    fn holds(&self, mode: BodyMode) -> bool {
        match mode {
            BodyMode::Json => self.json.is_some(),
            BodyMode::Raw => self.raw.is_some(),
            BodyMode::Form => self.form.is_some(),
        }
    }

    fn clear(&mut self, mode: BodyMode) {
        match mode {
            BodyMode::Json => self.json = None,
            BodyMode::Raw => self.raw = None,
            BodyMode::Form => self.form = None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthMode {
    #[default]
    None,
    Bearer,
    ApiKey,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::None => "none",
            AuthMode::Bearer => "bearer",
            AuthMode::ApiKey => "apiKey",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(AuthMode::None),
            "bearer" => Some(AuthMode::Bearer),
            "apiKey" => Some(AuthMode::ApiKey),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

impl ApiKeyLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Query => "query",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "header" => Some(ApiKeyLocation::Header),
            "query" => Some(ApiKeyLocation::Query),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub name: String,
    pub value: String,
    pub location: ApiKeyLocation,
}

impl Default for ApiKey {
    fn default() -> Self {
        Self {
            name: DEFAULT_API_KEY_NAME.to_string(),
            value: String::new(),
            location: ApiKeyLocation::Header,
        }
    }
}

/// Every credential the user has entered, plus which mode is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub bearer_token: String,
    pub api_key: ApiKey,
}

/// Credentials that apply to one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth<'a> {
    None,
    Bearer { token: &'a str },
    ApiKey(&'a ApiKey),
}

impl AuthConfig {
    pub fn active(&self) -> Auth<'_> {
        match self.mode {
            AuthMode::None => Auth::None,
            AuthMode::Bearer => Auth::Bearer {
                token: &self.bearer_token,
            },
            AuthMode::ApiKey => Auth::ApiKey(&self.api_key),
        }
    }
}

/// A request as the user edits it.
///
/// Never mutated by the send pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DescriptorFields")]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    /// Absolute URL, or a path resolved against the collection base URL.
    pub url: String,
    pub params: Vec<KeyValue>,
    pub headers: Vec<KeyValue>,
    body: BodyInput,
    #[serde(default)]
    drafts: BodyDrafts,
    pub auth: AuthConfig,
}

/// Wire shape of `RequestDescriptor`, checked before it becomes one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptorFields {
    method: HttpMethod,
    url: String,
    params: Vec<KeyValue>,
    headers: Vec<KeyValue>,
    body: BodyInput,
    #[serde(default)]
    drafts: BodyDrafts,
    auth: AuthConfig,
}

impl TryFrom<DescriptorFields> for RequestDescriptor {
    type Error = String;

    /// Rejects a draft for the active mode; empty drafts are dropped.
    fn try_from(mut fields: DescriptorFields) -> Result<Self, Self::Error> {
        let active = fields.body.mode();
        if fields.drafts.holds(active) {
            return Err(format!("draft given for active body mode {}", active.as_str()));
        }
        let mut drafts = BodyDrafts::default();
        for mode in BodyMode::ALL.into_iter().filter(|mode| *mode != active) {
            drafts.stash(fields.drafts.take(mode));
        }
        Ok(Self::from_parts(
            fields.method,
            fields.url,
            fields.params,
            fields.headers,
            fields.body,
            drafts,
            fields.auth,
        ))
    }
}

impl Default for RequestDescriptor {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            url: String::new(),
            params: blank_rows(),
            headers: blank_rows(),
            body: BodyInput::default(),
            drafts: BodyDrafts::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn body(&self) -> &BodyInput {
        &self.body
    }

    pub fn body_mode(&self) -> BodyMode {
        self.body.mode()
    }

    pub fn drafts(&self) -> &BodyDrafts {
        &self.drafts
    }

    /// Replace the active body. Any draft held for the new body's mode is
    /// discarded; when the mode changes, the previous body becomes a draft.
    pub fn set_body(&mut self, body: BodyInput) {
        self.drafts.clear(body.mode());
        if body.mode() == self.body.mode() {
            self.body = body;
        } else {
            let previous = std::mem::replace(&mut self.body, body);
            self.drafts.stash(previous);
        }
    }

    /// Make `mode` active, restoring whatever was last typed for it.
    pub fn switch_body_mode(&mut self, mode: BodyMode) {
        if self.body.mode() == mode {
            return;
        }
        let restored = self.drafts.take(mode);
        let previous = std::mem::replace(&mut self.body, restored);
        self.drafts.stash(previous);
    }

    /// Reformat a JSON body with two-space indentation. Leaves unparseable
    /// text and non-JSON bodies untouched.
    pub fn prettify_json(&mut self) {
        if let BodyInput::Json(text) = &mut self.body {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
                if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                    *text = pretty;
                }
            }
        }
    }

    pub(crate) fn from_parts(
        method: HttpMethod,
        url: String,
        params: Vec<KeyValue>,
        headers: Vec<KeyValue>,
        body: BodyInput,
        drafts: BodyDrafts,
        auth: AuthConfig,
    ) -> Self {
        Self {
            method,
            url,
            params,
            headers,
            body,
            drafts,
            auth,
        }
    }
}
