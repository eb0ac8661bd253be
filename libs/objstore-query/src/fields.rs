//! ORM `fields` → physical property whitelist.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::ModelDefinition;

/// ORM field selection: a list of names, or a `{name: bool}` mask.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldsSpec {
    List(Vec<String>),
    Mask(IndexMap<String, bool>),
}

impl FieldsSpec {
    /// Logical property names selected.
    ///
    /// A mask with only `false` entries selects every declared property
    /// except the excluded ones.
    #[must_use]
    pub fn selected<'a>(&'a self, model: &'a ModelDefinition) -> Vec<&'a str> {
        match self {
            FieldsSpec::List(names) => names.iter().map(String::as_str).collect(),
            FieldsSpec::Mask(mask) => {
                let included: Vec<&str> = mask
                    .iter()
                    .filter(|(_, on)| **on)
                    .map(|(name, _)| name.as_str())
                    .collect();
                if !included.is_empty() || mask.is_empty() {
                    return included;
                }
                model
                    .properties
                    .keys()
                    .filter(|name| !mask.contains_key(name.as_str()))
                    .map(String::as_str)
                    .collect()
            }
        }
    }
}

/// Map each selected logical property to its physical name.
///
/// An empty result means "no projection restriction".
#[must_use]
pub fn compile_fields(model: &ModelDefinition, fields: Option<&FieldsSpec>) -> Vec<String> {
    fields.map_or_else(Vec::new, |spec| {
        spec.selected(model)
            .into_iter()
            .map(|logical| model.physical_name(logical).to_owned())
            .collect()
    })
}
