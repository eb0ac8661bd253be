use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Filter expression in the object store's search dialect.
///
/// Serializes as `{"type": <kind>, <kind>: <body>}`, e.g.
/// `{"type": "terms", "terms": {"terms": ["x"], "field": "team.raw"}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CompiledFilter {
    /// Body is always the empty object `{}`.
    #[serde(rename_all = "camelCase")]
    MatchAll { match_all: Map<String, Value> },
    Terms { terms: TermsFilter },
    Not { not: Box<CompiledFilter> },
    And { and: Vec<CompiledFilter> },
    Or { or: Vec<CompiledFilter> },
    Wildcard { wildcard: WildcardFilter },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermsFilter {
    pub terms: Vec<Value>,
    pub field: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildcardFilter {
    pub field: String,
    pub value: String,
}

impl CompiledFilter {
    #[must_use]
    pub fn match_all() -> Self {
        CompiledFilter::MatchAll {
            match_all: Map::new(),
        }
    }

    #[must_use]
    pub fn terms(field: String, terms: Vec<Value>) -> Self {
        CompiledFilter::Terms {
            terms: TermsFilter { terms, field },
        }
    }

    #[must_use]
    pub fn wildcard(field: String, value: String) -> Self {
        CompiledFilter::Wildcard {
            wildcard: WildcardFilter { field, value },
        }
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: CompiledFilter) -> Self {
        CompiledFilter::Not {
            not: Box::new(inner),
        }
    }

    #[must_use]
    pub fn and(children: Vec<CompiledFilter>) -> Self {
        CompiledFilter::And { and: children }
    }

    #[must_use]
    pub fn or(children: Vec<CompiledFilter>) -> Self {
        CompiledFilter::Or { or: children }
    }

    #[must_use]
    pub fn is_match_all(&self) -> bool {
        matches!(self, CompiledFilter::MatchAll { .. })
    }

    /// JSON form sent to the search endpoint.
    #[must_use]
    pub fn to_json(&self) -> Value {
        // Every variant is a plain struct of JSON values; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
