//! Typed `where` tree and its parser.
//!
//! Raw ORM `where` objects are untyped JSON. [`WhereClause::parse`] turns them
//! into a closed set of variants so the compiler can match exhaustively.

use serde_json::{Map, Value};

use crate::error::{QueryError, QueryResult};

#[derive(Clone, Debug, PartialEq)]
pub enum WhereClause {
    Leaf { property: String, condition: Condition },
    And(Vec<WhereClause>),
    Or(Vec<WhereClause>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Eq(Value),
    Neq(Value),
    Inq(Vec<Value>),
    Like(String),
}

impl Condition {
    #[must_use]
    pub fn operator(&self) -> &'static str {
        match self {
            Condition::Eq(_) => "eq",
            Condition::Neq(_) => "neq",
            Condition::Inq(_) => "inq",
            Condition::Like(_) => "like",
        }
    }
}

impl WhereClause {
    #[must_use]
    pub fn eq(property: impl Into<String>, value: impl Into<Value>) -> Self {
        WhereClause::Leaf {
            property: property.into(),
            condition: Condition::Eq(value.into()),
        }
    }

    /// Parse a raw `where` object.
    ///
    /// `null` and `{}` mean "no restriction" and yield `Ok(None)`.
    ///
    /// # Errors
    /// - `QueryError::UnsupportedOperator` for an operator outside `neq`/`inq`/`like`
    /// - `QueryError::InvalidFilter` for any other malformed shape
    pub fn parse(raw: &Value) -> QueryResult<Option<Self>> {
        match raw {
            Value::Null => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            Value::Object(map) => parse_node(map).map(Some),
            other => Err(QueryError::InvalidFilter(format!(
                "expected an object, got {}",
                kind_of(other)
            ))),
        }
    }

    /// Property names referenced anywhere in the tree, in visit order.
    #[must_use]
    pub fn properties(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_properties(&mut out);
        out
    }

    fn collect_properties<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            WhereClause::Leaf { property, .. } => out.push(property),
            WhereClause::And(children) | WhereClause::Or(children) => {
                for c in children {
                    c.collect_properties(out);
                }
            }
        }
    }
}

fn parse_node(map: &Map<String, Value>) -> QueryResult<WhereClause> {
    let mut entries = map.iter();
    let (Some((key, value)), None) = (entries.next(), entries.next()) else {
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        return Err(QueryError::InvalidFilter(format!(
            "expected exactly one key per level, got [{}]",
            keys.join(", ")
        )));
    };

    match key.as_str() {
        "and" => parse_children(key, value).map(WhereClause::And),
        "or" => parse_children(key, value).map(WhereClause::Or),
        property => Ok(WhereClause::Leaf {
            property: property.to_owned(),
            condition: parse_condition(property, value)?,
        }),
    }
}

fn parse_children(op: &str, value: &Value) -> QueryResult<Vec<WhereClause>> {
    let Value::Array(items) = value else {
        return Err(QueryError::InvalidFilter(format!(
            "'{op}' expects an array, got {}",
            kind_of(value)
        )));
    };
    items
        .iter()
        .map(|item| match item {
            Value::Object(map) if !map.is_empty() => parse_node(map),
            other => Err(QueryError::InvalidFilter(format!(
                "'{op}' operand must be a non-empty object, got {}",
                kind_of(other)
            ))),
        })
        .collect()
}

fn parse_condition(property: &str, value: &Value) -> QueryResult<Condition> {
    let ops = match value {
        Value::Object(ops) => ops,
        Value::Array(_) => {
            return Err(QueryError::InvalidFilter(format!(
                "'{property}' cannot be compared with an array; use inq"
            )));
        }
        scalar => return Ok(Condition::Eq(scalar.clone())),
    };

    let mut entries = ops.iter();
    let (Some((op, operand)), None) = (entries.next(), entries.next()) else {
        return Err(QueryError::InvalidFilter(format!(
            "'{property}' expects exactly one operator, got {}",
            ops.len()
        )));
    };

    match op.as_str() {
        "neq" => Ok(Condition::Neq(operand.clone())),
        "inq" => match operand {
            Value::Array(values) => Ok(Condition::Inq(values.clone())),
            other => Err(QueryError::InvalidFilter(format!(
                "'inq' on '{property}' expects an array, got {}",
                kind_of(other)
            ))),
        },
        "like" => match operand {
            Value::String(pattern) => Ok(Condition::Like(pattern.clone())),
            other => Err(QueryError::InvalidFilter(format!(
                "'like' on '{property}' expects a string, got {}",
                kind_of(other)
            ))),
        },
        other => Err(QueryError::UnsupportedOperator {
            operator: other.to_owned(),
        }),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_where_has_no_clause() {
        assert_eq!(WhereClause::parse(&json!(null)).unwrap(), None);
        assert_eq!(WhereClause::parse(&json!({})).unwrap(), None);
    }

    #[test]
    fn parses_leaf_forms() {
        assert_eq!(
            WhereClause::parse(&json!({"team": "Bioprinting"})).unwrap(),
            Some(WhereClause::eq("team", "Bioprinting"))
        );
        assert_eq!(
            WhereClause::parse(&json!({"title": {"inq": ["a", "b"]}})).unwrap(),
            Some(WhereClause::Leaf {
                property: "title".to_owned(),
                condition: Condition::Inq(vec![json!("a"), json!("b")]),
            })
        );
        assert_eq!(
            WhereClause::parse(&json!({"title": {"like": "Pro*"}})).unwrap(),
            Some(WhereClause::Leaf {
                property: "title".to_owned(),
                condition: Condition::Like("Pro*".to_owned()),
            })
        );
    }

    #[test]
    fn null_equality_is_a_scalar_leaf() {
        assert_eq!(
            WhereClause::parse(&json!({"team": null})).unwrap(),
            Some(WhereClause::eq("team", Value::Null))
        );
    }

    #[test]
    fn parses_nested_combinators_in_order() {
        let clause = WhereClause::parse(&json!({
            "and": [{"team": "x"}, {"or": [{"title": "a"}, {"title": "b"}]}]
        }))
        .unwrap()
        .unwrap();
        assert_eq!(clause.properties(), ["team", "title", "title"]);
        let WhereClause::And(children) = clause else {
            panic!("expected and");
        };
        assert!(matches!(&children[1], WhereClause::Or(c) if c.len() == 2));
    }

    #[test]
    fn rejects_multiple_keys() {
        let err = WhereClause::parse(&json!({"team": "x", "title": "y"})).unwrap_err();
        assert!(matches!(err, QueryError::InvalidFilter(_)));
    }

    #[test]
    fn rejects_unknown_operator_by_name() {
        let err = WhereClause::parse(&json!({"p": {"gte": 5}})).unwrap_err();
        assert_eq!(
            err,
            QueryError::UnsupportedOperator {
                operator: "gte".to_owned()
            }
        );
        assert_eq!(err.to_string(), "'gte' operator is not supported");
    }

    #[test]
    fn rejects_malformed_operands() {
        for raw in [
            json!({"and": {"team": "x"}}),
            json!({"or": [1]}),
            json!({"title": {"inq": "a"}}),
            json!({"title": {"like": 3}}),
            json!({"title": {}}),
            json!({"title": {"neq": 1, "inq": [2]}}),
            json!({"title": [1, 2]}),
            json!("team"),
        ] {
            assert!(
                matches!(WhereClause::parse(&raw), Err(QueryError::InvalidFilter(_))),
                "{raw} should be rejected"
            );
        }
    }
}
