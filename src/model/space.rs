use crate::model::{ConfigDocument, Id};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A space as returned by the remote API. `serialized_space` is only
/// populated when the fetch asked for the full configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub space_id: Id,
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serialized_space: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Descriptor for creating a space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSpace {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serialized_space: Option<String>,
}

impl NewSpace {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            warehouse_id: None,
            serialized_space: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn warehouse_id(mut self, warehouse_id: impl Into<String>) -> Self {
        self.warehouse_id = Some(warehouse_id.into());
        self
    }

    /// Attach a config document, serialized into the string-embedded form.
    pub fn document(mut self, doc: &ConfigDocument) -> Result<Self, serde_json::Error> {
        self.serialized_space = Some(doc.to_serialized()?);
        Ok(self)
    }
}

/// Partial update sent via PATCH; absent fields are left untouched by the
/// remote store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpaceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serialized_space: Option<String>,
}

impl SpaceUpdate {
    pub fn serialized(raw: impl Into<String>) -> Self {
        Self {
            serialized_space: Some(raw.into()),
            ..Self::default()
        }
    }
}

/// Response shape for the list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpaceList {
    #[serde(default)]
    pub spaces: Vec<Space>,
}
