//! Model schema table.
//!
//! A [`ModelDefinition`] is built once when a model is registered and then
//! shared (`Arc`) with every compiler call. Property declaration order is
//! preserved; the inbound record mapper walks properties in that order.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// Per-property annotations relevant to the remote object store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawProperty", into = "RawProperty")]
#[must_use]
#[allow(clippy::struct_excessive_bools)]
pub struct PropertyDescriptor {
    pub physical_name: Option<String>,
    pub primary_key: bool,
    pub unique: bool,
    pub ignore: bool,
    pub id: bool,
}

impl PropertyDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn physical_name(mut self, name: impl Into<String>) -> Self {
        self.physical_name = Some(name.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    pub fn id(mut self) -> Self {
        self.id = true;
        self
    }
}

/// Wire shape of a property in a model definition file.
///
/// ORM-level keys (`type`, `required`, ...) are accepted and dropped.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProperty {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    id: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object_store: Option<RawObjectStoreAnnotations>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObjectStoreAnnotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    property_name: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    primary_key: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    unique: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    ignore: bool,
}

impl From<RawProperty> for PropertyDescriptor {
    fn from(raw: RawProperty) -> Self {
        let ann = raw.object_store.unwrap_or_default();
        Self {
            physical_name: ann.property_name,
            primary_key: ann.primary_key,
            unique: ann.unique,
            ignore: ann.ignore,
            id: raw.id,
        }
    }
}

impl From<PropertyDescriptor> for RawProperty {
    fn from(p: PropertyDescriptor) -> Self {
        let has_annotations = p.physical_name.is_some() || p.primary_key || p.unique || p.ignore;
        Self {
            id: p.id,
            object_store: has_annotations.then(|| RawObjectStoreAnnotations {
                property_name: p.physical_name,
                primary_key: p.primary_key,
                unique: p.unique,
                ignore: p.ignore,
            }),
        }
    }
}

/// Schema of one ORM model as seen by the object store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type_id: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyDescriptor>,
}

impl ModelDefinition {
    pub fn builder(name: impl Into<String>) -> ModelDefinitionBuilder {
        ModelDefinitionBuilder {
            def: ModelDefinition {
                name: name.into(),
                object_type_id: None,
                properties: IndexMap::new(),
            },
        }
    }

    /// Parse a model definition from its JSON form.
    ///
    /// # Errors
    /// Returns `QueryError::InvalidModelDefinition` if the value does not
    /// describe a model.
    pub fn from_json(value: serde_json::Value) -> QueryResult<Self> {
        serde_json::from_value(value).map_err(|e| QueryError::InvalidModelDefinition(e.to_string()))
    }

    #[must_use]
    pub fn property(&self, logical: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(logical)
    }

    #[must_use]
    pub fn has_property(&self, logical: &str) -> bool {
        self.properties.contains_key(logical)
    }
}

#[must_use]
pub struct ModelDefinitionBuilder {
    def: ModelDefinition,
}

impl ModelDefinitionBuilder {
    pub fn object_type_id(mut self, id: impl Into<String>) -> Self {
        self.def.object_type_id = Some(id.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, desc: PropertyDescriptor) -> Self {
        self.def.properties.insert(name.into(), desc);
        self
    }

    #[must_use]
    pub fn build(self) -> ModelDefinition {
        self.def
    }
}

/// Registered models keyed by name.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct SchemaRegistry {
    models: HashMap<String, Arc<ModelDefinition>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, model: ModelDefinition) -> Self {
        self.models.insert(model.name.clone(), Arc::new(model));
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ModelDefinition>> {
        self.models.get(name)
    }

    /// # Errors
    /// Returns `QueryError::UnknownModel` if no model named `name` is registered.
    pub fn require(&self, name: &str) -> QueryResult<&Arc<ModelDefinition>> {
        self.get(name)
            .ok_or_else(|| QueryError::UnknownModel(name.to_owned()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
