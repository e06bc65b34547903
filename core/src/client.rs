//! Request pipeline: descriptor in, interpreted response out.
//!
//! # Design
//! `ApiClient` holds only the active base URL and a `Dispatcher`. `build`
//! is pure and produces the exact `HttpRequest` that would go on the wire;
//! `parse` interprets a `FetchResult`. `send` is `build`, dispatch, `parse`.
//! Keeping the first and last steps free of I/O lets hosts preview the
//! outgoing request and lets tests check composition without a server.

use crate::body::resolve_body;
use crate::collection::{BaseUrlKind, Collection};
use crate::dispatch::{Dispatcher, FetchResult};
use crate::headers::compose_headers;
use crate::http::HttpRequest;
use crate::request::RequestDescriptor;
use crate::response::Response;
use crate::uri::{compose_url, normalize_base_url, resolve_url, QueryApiKey};

#[derive(Debug, Clone, Default)]
pub struct ApiClient {
    base_url: String,
    dispatcher: Dispatcher,
}

impl ApiClient {
    /// A client resolving relative paths against `base_url`. An empty base
    /// URL sends every request URL as entered.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            dispatcher: Dispatcher::new(),
        }
    }

    /// A client for the active collection, if any.
    pub fn for_collection(collection: Option<&Collection>, kind: BaseUrlKind) -> Self {
        let base_url = collection.map(|c| c.base_url(kind)).unwrap_or_default();
        Self::new(&base_url)
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build(&self, request: &RequestDescriptor) -> HttpRequest {
        let auth = request.auth.active();
        let target = resolve_url(&request.url, &self.base_url);
        let url = compose_url(&target, &request.params, QueryApiKey::from_auth(auth));

        let mut headers = compose_headers(&request.headers, auth);
        let body = resolve_body(request.method, request.body());
        body.apply_content_type(&mut headers);

        HttpRequest {
            method: request.method,
            url,
            headers,
            body: body.body,
        }
    }

    pub fn parse(&self, result: FetchResult) -> Response {
        Response::from(result)
    }

    pub async fn send(&self, request: &RequestDescriptor) -> Response {
        let outgoing = self.build(request);
        let result = self.dispatcher.send(&outgoing).await;
        self.parse(result)
    }
}
