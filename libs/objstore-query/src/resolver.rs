//! Logical ↔ physical property name resolution.

use serde_json::{Map, Value};

use crate::error::{QueryError, QueryResult};
use crate::schema::{ModelDefinition, SchemaRegistry};

/// Flat ORM record: logical (or physical) property name → value.
pub type Record = Map<String, Value>;

/// Suffix selecting the non-analyzed variant of an indexed field.
pub const EXACT_MATCH_SUFFIX: &str = ".raw";

/// Property names that live at the top level of a remote object instead of
/// inside its `properties` map.
pub const STANDARD_PROPERTIES: &[&str] = &[
    "objectRid",
    "objectTypeId",
    "title",
    "properties",
    "primaryKey",
    "baseVersion",
    "editsVersion",
    "workstateEditsVersion",
];

#[must_use]
pub fn is_standard_property(name: &str) -> bool {
    STANDARD_PROPERTIES.contains(&name)
}

/// `physical.raw`
#[must_use]
pub fn exact_field(physical: &str) -> String {
    format!("{physical}{EXACT_MATCH_SUFFIX}")
}

impl ModelDefinition {
    /// Physical name for `logical`, falling back to `logical` itself.
    #[must_use]
    pub fn physical_name<'a>(&'a self, logical: &'a str) -> &'a str {
        self.property(logical)
            .and_then(|p| p.physical_name.as_deref())
            .unwrap_or(logical)
    }

    /// Physical name of the property flagged `primaryKey`.
    ///
    /// # Errors
    /// Returns `QueryError::MissingPrimaryKeyConfiguration` when no property
    /// carries the flag.
    pub fn primary_key_physical_name(&self) -> QueryResult<&str> {
        self.properties
            .iter()
            .find(|(_, p)| p.primary_key)
            .map(|(logical, _)| self.physical_name(logical))
            .ok_or_else(|| QueryError::MissingPrimaryKeyConfiguration {
                model: self.name.clone(),
            })
    }

    /// Logical property flagged `id` (the ORM identity field).
    #[must_use]
    pub fn identity_property(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|(_, p)| p.id)
            .map(|(name, _)| name.as_str())
    }

    /// Logical property flagged `unique`.
    #[must_use]
    pub fn unique_property(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|(_, p)| p.unique)
            .map(|(name, _)| name.as_str())
    }

    /// # Errors
    /// Returns `QueryError::MissingUniqueProperty` when no property is flagged `unique`.
    pub fn require_unique_property(&self) -> QueryResult<&str> {
        self.unique_property()
            .ok_or_else(|| QueryError::MissingUniqueProperty {
                model: self.name.clone(),
            })
    }

    #[must_use]
    pub fn is_ignored(&self, logical: &str) -> bool {
        self.property(logical).is_some_and(|p| p.ignore)
    }

    /// `data` without the keys flagged `ignore`.
    #[must_use]
    pub fn active_properties(&self, data: &Record) -> Record {
        data.iter()
            .filter(|(key, _)| !self.is_ignored(key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl SchemaRegistry {
    /// Active (non-ignored) subset of `data` for the named model.
    ///
    /// An unknown or absent model passes `data` through unchanged; absent
    /// `data` yields an empty record.
    #[must_use]
    pub fn active_properties(&self, model: Option<&str>, data: Option<&Record>) -> Record {
        let Some(data) = data else {
            return Record::new();
        };
        match model.and_then(|name| self.get(name)) {
            Some(def) => def.active_properties(data),
            None => data.clone(),
        }
    }
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
        match v {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn physical_name_falls_back_to_logical() {
        let m = project();
        assert_eq!(m.physical_name("title"), "project");
        assert_eq!(m.physical_name("team"), "team");
        assert_eq!(m.physical_name("notDeclared"), "notDeclared");
    }

    #[test]
    fn special_properties() {
        let m = project();
        assert_eq!(m.primary_key_physical_name().unwrap(), "project_uid");
        assert_eq!(m.identity_property(), Some("id"));
        assert_eq!(m.unique_property(), Some("title"));
    }

    #[test]
    fn primary_key_uses_logical_name_without_override() {
        let m = ModelDefinition::builder("Thing")
            .property("code", PropertyDescriptor::new().primary_key())
            .build();
        assert_eq!(m.primary_key_physical_name().unwrap(), "code");
    }

    #[test]
    fn missing_primary_key_is_a_configuration_error() {
        let m = ModelDefinition::builder("Thing")
            .property("name", PropertyDescriptor::new())
            .build();
        assert_eq!(
            m.primary_key_physical_name().unwrap_err(),
            QueryError::MissingPrimaryKeyConfiguration {
                model: "Thing".to_owned()
            }
        );
        assert!(matches!(
            m.require_unique_property(),
            Err(QueryError::MissingUniqueProperty { .. })
        ));
    }

    #[test]
    fn active_properties_for_empty_and_missing_data() {
        let registry = SchemaRegistry::new().register(project());
        assert!(registry.active_properties(Some("Project"), Some(&Record::new())).is_empty());
        assert!(registry.active_properties(Some("Project"), None).is_empty());
        assert!(registry.active_properties(None, None).is_empty());
    }

    #[test]
    fn active_properties_without_model_returns_data() {
        let registry = SchemaRegistry::new().register(project());
        let data = record(json!({
            "id": "test", "title": "test", "objectTypeId": "test",
            "team": "test", "projectId": 0, "testProp": "test"
        }));
        assert_eq!(registry.active_properties(None, Some(&data)), data);
        assert_eq!(registry.active_properties(Some("Unknown"), Some(&data)), data);
    }

    #[test]
    fn active_properties_drops_ignored_fields() {
        let registry = SchemaRegistry::new().register(project());
        let data = record(json!({
            "id": "test", "title": "test", "objectTypeId": "test",
            "team": "test", "projectId": 0, "testProp": "test"
        }));
        let active = registry.active_properties(Some("Project"), Some(&data));
        assert_eq!(active.len(), 5);
        assert!(!active.contains_key("testProp"));
    }

    #[test]
    fn standard_property_set() {
        assert!(is_standard_property("objectTypeId"));
        assert!(is_standard_property("primaryKey"));
        assert!(!is_standard_property("team"));
        assert_eq!(exact_field("project"), "project.raw");
    }
}
