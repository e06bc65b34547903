//! Named groups of saved requests with per-environment base URLs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::uri::normalize_base_url;

pub type CollectionId = Uuid;

/// Which of a collection's base URLs requests resolve against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseUrlKind {
    Prod,
    #[default]
    Dev,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub base_url_prod: String,
    pub base_url_dev: String,
    pub base_url_custom: Option<String>,
}

impl Collection {
    /// The normalized base URL for `kind`; empty when none is configured.
    pub fn base_url(&self, kind: BaseUrlKind) -> String {
        let raw = match kind {
            BaseUrlKind::Prod => self.base_url_prod.as_str(),
            BaseUrlKind::Dev => self.base_url_dev.as_str(),
            BaseUrlKind::Custom => self.base_url_custom.as_deref().unwrap_or_default(),
        };
        normalize_base_url(raw)
    }
}

/// Input for creating a collection. A missing dev URL is stored as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCollection {
    pub name: String,
    pub base_url_prod: String,
    #[serde(default)]
    pub base_url_dev: Option<String>,
    #[serde(default)]
    pub base_url_custom: Option<String>,
}

/// Partial update: only `Some` fields are applied. `base_url_custom:
/// Some(None)` clears the custom URL.
#[derive(Debug, Clone, Default)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub base_url_prod: Option<String>,
    pub base_url_dev: Option<String>,
    pub base_url_custom: Option<Option<String>>,
}

impl CollectionPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.base_url_prod.is_none()
            && self.base_url_dev.is_none()
            && self.base_url_custom.is_none()
    }

    pub(crate) fn apply(self, collection: &mut Collection) {
        if let Some(name) = self.name {
            collection.name = name;
        }
        if let Some(url) = self.base_url_prod {
            collection.base_url_prod = url;
        }
        if let Some(url) = self.base_url_dev {
            collection.base_url_dev = url;
        }
        if let Some(url) = self.base_url_custom {
            collection.base_url_custom = url;
        }
    }
}
