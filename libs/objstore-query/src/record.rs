//! Bidirectional mapping between flat ORM records and remote objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QueryError, QueryResult};
use crate::resolver::{Record, is_standard_property};
use crate::schema::ModelDefinition;

/// Object as stored by the remote service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    #[serde(default)]
    pub primary_key: Record,
    #[serde(default)]
    pub properties: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_rid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_version: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edits_version: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workstate_edits_version: Option<Value>,
}

impl RemoteObject {
    /// Decode a loaded object; `null` and `{}` mean "not found".
    ///
    /// # Errors
    /// Returns `QueryError::InvalidRemoteObject` if the value has the wrong shape.
    pub fn from_json(value: Value) -> QueryResult<Option<Self>> {
        match &value {
            Value::Null => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            _ => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| QueryError::InvalidRemoteObject(e.to_string())),
        }
    }

    /// Top-level value for one of the standard property names.
    #[must_use]
    pub fn standard_value(&self, name: &str) -> Option<Value> {
        let string = |s: &Option<String>| s.clone().map(Value::String);
        match name {
            "objectRid" => string(&self.object_rid),
            "objectTypeId" => string(&self.object_type_id),
            "title" => self.title.clone(),
            "properties" => Some(Value::Object(self.properties.clone())),
            "primaryKey" => Some(Value::Object(self.primary_key.clone())),
            "baseVersion" => self.base_version.clone(),
            "editsVersion" => self.edits_version.clone(),
            "workstateEditsVersion" => self.workstate_edits_version.clone(),
            _ => None,
        }
    }
}

/// Outbound: active properties renamed to physical names, without the
/// standard top-level names.
#[must_use]
pub fn to_remote_properties(model: &ModelDefinition, data: &Record) -> Record {
    model
        .active_properties(data)
        .into_iter()
        .filter_map(|(logical, value)| {
            let physical = model.physical_name(&logical);
            (!is_standard_property(physical)).then(|| (physical.to_owned(), value))
        })
        .collect()
}

/// Inbound: rebuild the flat ORM record from a remote object.
///
/// A non-empty `whitelist` of physical names restricts the output to those
/// properties. Values missing on the remote side are omitted.
#[must_use]
pub fn to_instance(
    model: &ModelDefinition,
    remote: Option<&RemoteObject>,
    whitelist: &[String],
) -> Option<Record> {
    let remote = remote?;
    let identity = model.identity_property();
    let mut out = Record::new();

    for logical in model.properties.keys() {
        let physical = model.physical_name(logical);
        if !whitelist.is_empty() && !whitelist.iter().any(|w| w == physical) {
            continue;
        }
        let value = if identity == Some(logical.as_str()) {
            remote.primary_key.get(physical).cloned()
        } else if is_standard_property(physical) {
            remote.standard_value(physical)
        } else {
            remote.properties.get(physical).cloned()
        };
        if let Some(value) = value {
            out.insert(logical.clone(), value);
        }
    }
    Some(out)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::schema::PropertyDescriptor;
    use serde_json::json;

    fn project() -> ModelDefinition {
        ModelDefinition::builder("Project")
            .property(
                "id",
                PropertyDescriptor::new().id().primary_key().physical_name("project_uid"),
            )
            .property("title", PropertyDescriptor::new().unique().physical_name("project"))
            .property("objectTypeId", PropertyDescriptor::new())
            .property("team", PropertyDescriptor::new())
            .property("projectId", PropertyDescriptor::new().physical_name("project_id"))
            .property("testProp", PropertyDescriptor::new().ignore().physical_name("test_prop"))
            .build()
    }

    fn record(v: Value) -> Record {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn outbound_renames_and_strips() {
        let data = record(json!({
            "id": "abc", "title": "Test", "objectTypeId": "T",
            "team": "X", "projectId": 7, "testProp": "drop me"
        }));
        assert_eq!(
            Value::Object(to_remote_properties(&project(), &data)),
            json!({"project_uid": "abc", "project": "Test", "team": "X", "project_id": 7})
        );
    }

    #[test]
    fn inbound_reads_identity_standard_and_nested_values() {
        let remote = RemoteObject::from_json(json!({
            "primaryKey": {"project_uid": "abc"},
            "properties": {"project": "Test", "team": "X", "project_id": 7, "test_prop": "t"},
            "objectTypeId": "T",
            "objectRid": "ri.1",
            "title": "Test"
        }))
        .unwrap();

        let instance = to_instance(&project(), remote.as_ref(), &[]).unwrap();
        assert_eq!(
            Value::Object(instance),
            json!({
                "id": "abc", "title": "Test", "objectTypeId": "T",
                "team": "X", "projectId": 7, "testProp": "t"
            })
        );
    }

    #[test]
    fn inbound_honours_whitelist() {
        let remote = RemoteObject {
            properties: record(json!({"project": "Test", "team": "X"})),
            ..RemoteObject::default()
        };
        let instance = to_instance(&project(), Some(&remote), &["team".to_owned()]).unwrap();
        assert_eq!(Value::Object(instance), json!({"team": "X"}));
    }

    #[test]
    fn inbound_absent_object_is_absent() {
        assert_eq!(to_instance(&project(), None, &[]), None);
        assert_eq!(RemoteObject::from_json(json!(null)).unwrap(), None);
        assert_eq!(RemoteObject::from_json(json!({})).unwrap(), None);
    }

    #[test]
    fn malformed_remote_object_is_rejected() {
        let err = RemoteObject::from_json(json!({"properties": 5})).unwrap_err();
        assert!(matches!(err, QueryError::InvalidRemoteObject(_)));
    }

    #[test]
    fn round_trip_of_active_properties() {
        let model = project();
        let data = record(json!({"team": "X"}));
        let remote = RemoteObject {
            properties: to_remote_properties(&model, &data),
            ..RemoteObject::default()
        };
        assert_eq!(to_instance(&model, Some(&remote), &[]), Some(data));
    }
}
