//! Error types for the transport and persistence seams.
//!
//! # Design
//! Composition never fails, so there is no error type for it. A
//! `TransportError` never reaches the caller of `Dispatcher::send`: its
//! `Display` text becomes the `error` message of a failed `FetchResult`.
//! `StoreError` is returned by `Store` implementations as-is.

use thiserror::Error;
use uuid::Uuid;

/// Why an HTTP exchange did not complete.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The dispatcher's timeout elapsed and the call was aborted.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The request could not be built (malformed URL, illegal header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// DNS resolution or TCP/TLS connection failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The exchange started but failed before the body was fully read.
    #[error("network error: {0}")]
    Network(String),
}

/// Errors returned by `Store` implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("collection {0} not found")]
    CollectionNotFound(Uuid),

    #[error("request {0} not found")]
    RequestNotFound(Uuid),

    /// A request was saved without an active collection.
    #[error("no collection selected")]
    MissingCollection,

    /// A stored row could not be decoded back into a request.
    #[error("corrupt stored request: {0}")]
    Codec(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Codec(e.to_string())
    }
}
