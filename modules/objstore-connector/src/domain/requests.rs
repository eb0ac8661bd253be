//! Wire bodies of the object store edit, load and search endpoints.

use objstore_query::{CompiledFilter, Record, RemoteObject, SortKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Object type plus primary-key mapping; addresses one remote object.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub struct ObjectLocator {
    pub type_id: String,
    pub primary_key: Record,
}

impl ObjectLocator {
    pub fn single(type_id: String, pk_name: &str, pk_value: Value) -> Self {
        let mut primary_key = Record::new();
        primary_key.insert(pk_name.to_owned(), pk_value);
        Self {
            type_id,
            primary_key,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PropertiesBody {
    pub properties: Record,
}

/// Edit event; serialized as `{"type": kind, kind: body}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
#[must_use]
pub enum EditPayload {
    #[serde(rename_all = "camelCase")]
    ObjectAdded { object_added: PropertiesBody },
    #[serde(rename_all = "camelCase")]
    ObjectModified { object_modified: PropertiesBody },
    /// Body is always the empty object `{}`.
    #[serde(rename_all = "camelCase")]
    ObjectDeleted { object_deleted: Map<String, Value> },
}

impl EditPayload {
    pub fn added(properties: Record) -> Self {
        Self::ObjectAdded {
            object_added: PropertiesBody { properties },
        }
    }

    pub fn modified(properties: Record) -> Self {
        Self::ObjectModified {
            object_modified: PropertiesBody { properties },
        }
    }

    pub fn deleted() -> Self {
        Self::ObjectDeleted {
            object_deleted: Map::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub custom_metadata: Map<String, Value>,
    pub payload: EditPayload,
}

/// Body of the single and bulk edit endpoints.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[must_use]
pub struct LocatorEdit {
    pub locator: ObjectLocator,
    pub request: EditRequest,
}

impl LocatorEdit {
    pub fn new(locator: ObjectLocator, payload: EditPayload) -> Self {
        Self {
            locator,
            request: EditRequest {
                custom_metadata: Map::new(),
                payload,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub object_types: Vec<String>,
    pub filter: CompiledFilter,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_selector: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortKey>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
    #[serde(default)]
    pub total_hits: u64,
}

/// One search hit: `{"object": {...}}`, or the object itself.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SearchHit {
    Wrapped { object: RemoteObject },
    Bare(RemoteObject),
}

impl SearchHit {
    #[must_use]
    pub fn object(&self) -> &RemoteObject {
        match self {
            SearchHit::Wrapped { object } | SearchHit::Bare(object) => object,
        }
    }
}
