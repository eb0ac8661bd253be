//! ORM `order` → sort expression list.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{QueryError, QueryResult};
use crate::resolver::exact_field;
use crate::schema::ModelDefinition;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl SortDir {
    /// `desc` (any case) is descending; everything else, including nothing, is ascending.
    #[must_use]
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(t) if t.eq_ignore_ascii_case("desc") => SortDir::Desc,
            _ => SortDir::Asc,
        }
    }
}

/// ORM `order` value: a single `"prop [ASC|DESC]"` string or a list of them.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OrderSpec {
    Single(String),
    Many(Vec<String>),
}

impl OrderSpec {
    #[must_use]
    pub fn expressions(&self) -> &[String] {
        match self {
            OrderSpec::Single(s) => std::slice::from_ref(s),
            OrderSpec::Many(v) => v,
        }
    }
}

impl From<&str> for OrderSpec {
    fn from(s: &str) -> Self {
        OrderSpec::Single(s.to_owned())
    }
}

/// One entry of the remote sort list.
///
/// Serializes as `{"<field>": {"order": "asc"|"desc"}}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub dir: SortDir,
}

#[derive(Serialize)]
struct OrderBody {
    order: SortDir,
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &OrderBody { order: self.dir })?;
        map.end()
    }
}

/// Compile an `order` value, preserving its precedence.
///
/// # Errors
/// Returns `QueryError::InvalidOrder` for a blank expression.
pub fn compile_order(model: &ModelDefinition, order: &OrderSpec) -> QueryResult<Vec<SortKey>> {
    order
        .expressions()
        .iter()
        .map(|expr| compile_expression(model, expr))
        .collect()
}

fn compile_expression(model: &ModelDefinition, expr: &str) -> QueryResult<SortKey> {
    let mut parts = expr.split_whitespace();
    let property = parts
        .next()
        .ok_or_else(|| QueryError::InvalidOrder(format!("empty sort expression '{expr}'")))?;
    Ok(SortKey {
        field: exact_field(model.physical_name(property)),
        dir: SortDir::from_token(parts.next()),
    })
}
