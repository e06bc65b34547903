//! Request construction and execution core for an API-testing client.
//!
//! # Overview
//! Turns a user-edited `RequestDescriptor` into a wire-level `HttpRequest`,
//! sends it with a bounded timeout, and normalizes the outcome into a
//! `FetchResult` that a host can display.
//!
//! # Design
//! - Composition (`uri`, `headers`, `body`) is pure and infallible: blank
//!   or missing input is omitted, never an error.
//! - `Dispatcher` is the only I/O boundary and never fails; transport
//!   errors become `FetchResult { status: 0, error: Some(..) }`.
//! - `ApiClient` is stateless apart from its base URL, so concurrent sends
//!   are independent.
//! - Collections and saved requests sit behind the `Store` trait; the core
//!   itself holds no process-wide state.

pub mod body;
pub mod client;
pub mod collection;
pub mod dispatch;
pub mod error;
pub mod headers;
pub mod http;
pub mod kv;
pub mod request;
pub mod response;
pub mod store;
pub mod uri;

pub use client::ApiClient;
pub use collection::{BaseUrlKind, Collection, CollectionId, CollectionPatch, NewCollection};
pub use dispatch::{DispatchConfig, Dispatcher, FetchResult, ReqwestTransport, Transport};
pub use error::{StoreError, TransportError};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse};
pub use kv::KeyValue;
pub use request::{
    ApiKey, ApiKeyLocation, Auth, AuthConfig, AuthMode, BodyInput, BodyMode, RequestDescriptor,
};
pub use response::{BodyView, Response, StatusClass};
pub use store::{MemoryStore, RequestId, RequestRecord, SavedRequest, Store};
