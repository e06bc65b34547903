//! Persistence of collections and saved requests.
//!
//! # Design
//! Requests are stored in a flat row form (`RequestRecord`) whose columns
//! mirror the descriptor field-for-field, with row lists held as JSON text.
//! Encoding and decoding are lossless: every field of a descriptor,
//! including bodies typed for inactive modes and credentials for inactive
//! auth modes, survives a save/load cycle.
//!
//! `Store` is the seam a host plugs its own database into. `MemoryStore`
//! keeps everything in process behind a `tokio` lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::collection::{Collection, CollectionId, CollectionPatch, NewCollection};
use crate::error::StoreError;
use crate::http::HttpMethod;
use crate::kv::KeyValue;
use crate::request::{
    ApiKey, ApiKeyLocation, AuthConfig, AuthMode, BodyDrafts, BodyInput, BodyMode,
    RequestDescriptor,
};

pub type RequestId = Uuid;

/// A request descriptor in stored row form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: RequestId,
    pub collection_id: CollectionId,
    pub name: Option<String>,
    pub method: String,
    pub path: String,
    pub params_json: String,
    pub headers_json: String,
    pub body_type: String,
    pub body_json: String,
    pub body_raw: String,
    pub body_form_json: String,
    pub auth_type: String,
    pub bearer_token: String,
    pub api_key_location: String,
    pub api_key_name: String,
    pub api_key_value: String,
}

impl RequestRecord {
    pub fn encode(
        id: RequestId,
        collection_id: CollectionId,
        name: Option<String>,
        request: &RequestDescriptor,
    ) -> Result<Self, StoreError> {
        let (body_json, body_raw, body_form) = body_columns(request);
        Ok(Self {
            id,
            collection_id,
            name,
            method: request.method.as_str().to_string(),
            path: request.url.clone(),
            params_json: serde_json::to_string(&request.params)?,
            headers_json: serde_json::to_string(&request.headers)?,
            body_type: request.body_mode().as_str().to_string(),
            body_json,
            body_raw,
            body_form_json: serde_json::to_string(&body_form)?,
            auth_type: request.auth.mode.as_str().to_string(),
            bearer_token: request.auth.bearer_token.clone(),
            api_key_location: request.auth.api_key.location.as_str().to_string(),
            api_key_name: request.auth.api_key.name.clone(),
            api_key_value: request.auth.api_key.value.clone(),
        })
    }

    pub fn decode(&self) -> Result<RequestDescriptor, StoreError> {
        let method: HttpMethod = self.method.parse().map_err(StoreError::Codec)?;
        let mode = BodyMode::parse(&self.body_type)
            .ok_or_else(|| StoreError::Codec(format!("unknown body type: {}", self.body_type)))?;
        let auth_mode = AuthMode::parse(&self.auth_type)
            .ok_or_else(|| StoreError::Codec(format!("unknown auth type: {}", self.auth_type)))?;
        let location = ApiKeyLocation::parse(&self.api_key_location).ok_or_else(|| {
            StoreError::Codec(format!("unknown api key location: {}", self.api_key_location))
        })?;
        let params: Vec<KeyValue> = serde_json::from_str(&self.params_json)?;
        let headers: Vec<KeyValue> = serde_json::from_str(&self.headers_json)?;
        let form: Vec<KeyValue> = serde_json::from_str(&self.body_form_json)?;

        let mut body = None;
        let mut drafts = BodyDrafts::default();
        for input in [
            BodyInput::Json(self.body_json.clone()),
            BodyInput::Raw(self.body_raw.clone()),
            BodyInput::Form(form),
        ] {
            if input.mode() == mode {
                body = Some(input);
            } else {
                drafts.stash(input);
            }
        }

        Ok(RequestDescriptor::from_parts(
            method,
            self.path.clone(),
            params,
            headers,
            body.unwrap_or_else(|| BodyInput::empty(mode)),
            drafts,
            AuthConfig {
                mode: auth_mode,
                bearer_token: self.bearer_token.clone(),
                api_key: ApiKey {
                    name: self.api_key_name.clone(),
                    value: self.api_key_value.clone(),
                    location,
                },
            },
        ))
    }
}

/// The JSON, raw, and form columns: the active body for its own mode,
/// drafts (or empty input) for the others.
fn body_columns(request: &RequestDescriptor) -> (String, String, Vec<KeyValue>) {
    let (mut json, mut raw, mut form) = (None, None, None);
    let drafts = request.drafts();
    for input in [
        request.body().clone(),
        drafts.peek(BodyMode::Json),
        drafts.peek(BodyMode::Raw),
        drafts.peek(BodyMode::Form),
    ] {
        match input {
            BodyInput::Json(text) => {
                json.get_or_insert(text);
            }
            BodyInput::Raw(text) => {
                raw.get_or_insert(text);
            }
            BodyInput::Form(rows) => {
                form.get_or_insert(rows);
            }
        }
    }
    (
        json.unwrap_or_default(),
        raw.unwrap_or_default(),
        form.unwrap_or_default(),
    )
}

/// A request as loaded from a `Store`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRequest {
    pub id: RequestId,
    pub collection_id: CollectionId,
    pub name: Option<String>,
    pub request: RequestDescriptor,
}

impl TryFrom<&RequestRecord> for SavedRequest {
    type Error = StoreError;

    fn try_from(record: &RequestRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            collection_id: record.collection_id,
            name: record.name.clone(),
            request: record.decode()?,
        })
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// All collections, ordered by name.
    async fn list_collections(&self) -> Result<Vec<Collection>, StoreError>;

    async fn get_collection(&self, id: CollectionId) -> Result<Collection, StoreError>;

    async fn create_collection(&self, input: NewCollection) -> Result<Collection, StoreError>;

    async fn update_collection(
        &self,
        id: CollectionId,
        patch: CollectionPatch,
    ) -> Result<Collection, StoreError>;

    /// Delete a collection and every request saved in it.
    async fn delete_collection(&self, id: CollectionId) -> Result<(), StoreError>;

    /// Requests in a collection, ordered by name (unnamed first), then by
    /// when they were first saved.
    async fn list_requests(&self, collection_id: CollectionId)
        -> Result<Vec<SavedRequest>, StoreError>;

    async fn get_request(&self, id: RequestId) -> Result<SavedRequest, StoreError>;

    /// Insert `request`, or overwrite `existing` when given. Fails with
    /// `MissingCollection` when no collection is active.
    async fn save_request(
        &self,
        collection_id: Option<CollectionId>,
        name: Option<String>,
        request: &RequestDescriptor,
        existing: Option<RequestId>,
    ) -> Result<SavedRequest, StoreError>;

    async fn delete_request(&self, id: RequestId) -> Result<(), StoreError>;
}

#[derive(Debug)]
struct StoredRequest {
    seq: u64,
    record: RequestRecord,
}

#[derive(Debug, Default)]
struct Tables {
    collections: HashMap<CollectionId, Collection>,
    requests: HashMap<RequestId, StoredRequest>,
    next_seq: u64,
}

/// In-process `Store`. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_collections(&self) -> Result<Vec<Collection>, StoreError> {
        let tables = self.tables.read().await;
        let mut collections: Vec<Collection> = tables.collections.values().cloned().collect();
        collections.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(collections)
    }

    async fn get_collection(&self, id: CollectionId) -> Result<Collection, StoreError> {
        let tables = self.tables.read().await;
        tables
            .collections
            .get(&id)
            .cloned()
            .ok_or(StoreError::CollectionNotFound(id))
    }

    async fn create_collection(&self, input: NewCollection) -> Result<Collection, StoreError> {
        let collection = Collection {
            id: Uuid::new_v4(),
            name: input.name,
            base_url_prod: input.base_url_prod,
            base_url_dev: input.base_url_dev.unwrap_or_default(),
            base_url_custom: input.base_url_custom,
        };
        debug!(collection = %collection.id, name = %collection.name, "created collection");
        self.tables
            .write()
            .await
            .collections
            .insert(collection.id, collection.clone());
        Ok(collection)
    }

    async fn update_collection(
        &self,
        id: CollectionId,
        patch: CollectionPatch,
    ) -> Result<Collection, StoreError> {
        if patch.is_empty() {
            return self.get_collection(id).await;
        }
        let mut tables = self.tables.write().await;
        let collection = tables
            .collections
            .get_mut(&id)
            .ok_or(StoreError::CollectionNotFound(id))?;
        patch.apply(collection);
        debug!(collection = %id, "updated collection");
        Ok(collection.clone())
    }

    async fn delete_collection(&self, id: CollectionId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .collections
            .remove(&id)
            .ok_or(StoreError::CollectionNotFound(id))?;
        tables
            .requests
            .retain(|_, stored| stored.record.collection_id != id);
        debug!(collection = %id, "deleted collection and its requests");
        Ok(())
    }

    async fn list_requests(
        &self,
        collection_id: CollectionId,
    ) -> Result<Vec<SavedRequest>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&StoredRequest> = tables
            .requests
            .values()
            .filter(|stored| stored.record.collection_id == collection_id)
            .collect();
        rows.sort_by(|a, b| {
            a.record
                .name
                .cmp(&b.record.name)
                .then(a.seq.cmp(&b.seq))
        });
        rows.into_iter()
            .map(|stored| SavedRequest::try_from(&stored.record))
            .collect()
    }

    async fn get_request(&self, id: RequestId) -> Result<SavedRequest, StoreError> {
        let tables = self.tables.read().await;
        let stored = tables
            .requests
            .get(&id)
            .ok_or(StoreError::RequestNotFound(id))?;
        SavedRequest::try_from(&stored.record)
    }

    async fn save_request(
        &self,
        collection_id: Option<CollectionId>,
        name: Option<String>,
        request: &RequestDescriptor,
        existing: Option<RequestId>,
    ) -> Result<SavedRequest, StoreError> {
        let collection_id = collection_id.ok_or(StoreError::MissingCollection)?;
        let mut tables = self.tables.write().await;
        if !tables.collections.contains_key(&collection_id) {
            return Err(StoreError::CollectionNotFound(collection_id));
        }

        let (id, seq) = match existing {
            Some(id) => {
                let stored = tables
                    .requests
                    .get(&id)
                    .ok_or(StoreError::RequestNotFound(id))?;
                (id, stored.seq)
            }
            None => {
                let seq = tables.next_seq;
                tables.next_seq += 1;
                (Uuid::new_v4(), seq)
            }
        };

        let record = RequestRecord::encode(id, collection_id, name, request)?;
        let saved = SavedRequest::try_from(&record)?;
        tables.requests.insert(id, StoredRequest { seq, record });
        debug!(request = %id, collection = %collection_id, "saved request");
        Ok(saved)
    }

    async fn delete_request(&self, id: RequestId) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .requests
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::RequestNotFound(id))
    }
}
