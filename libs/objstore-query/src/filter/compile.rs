//! `WhereClause` → [`CompiledFilter`] compiler.

use serde_json::Value;

use super::ast::{Condition, WhereClause};
use super::compiled::CompiledFilter;
use crate::error::{QueryError, QueryResult};
use crate::resolver::exact_field;
use crate::schema::ModelDefinition;

/// Compile a parsed clause; `None` compiles to `matchAll`.
///
/// # Errors
/// Returns `QueryError::UnknownProperty` if a leaf names a property the model
/// does not declare.
pub fn compile_clause(
    model: &ModelDefinition,
    clause: Option<&WhereClause>,
) -> QueryResult<CompiledFilter> {
    match clause {
        None => Ok(CompiledFilter::match_all()),
        Some(clause) => compile_node(model, clause),
    }
}

/// Parse and compile a raw ORM `where` object.
///
/// # Errors
/// Any parse error from [`WhereClause::parse`] or compile error from
/// [`compile_clause`].
pub fn build_where(model: &ModelDefinition, raw: &Value) -> QueryResult<CompiledFilter> {
    let clause = WhereClause::parse(raw)?;
    let compiled = compile_clause(model, clause.as_ref())?;
    tracing::trace!(model = %model.name, filter = ?compiled, "compiled where clause");
    Ok(compiled)
}

fn compile_node(model: &ModelDefinition, clause: &WhereClause) -> QueryResult<CompiledFilter> {
    match clause {
        WhereClause::Leaf {
            property,
            condition,
        } => compile_leaf(model, property, condition),
        WhereClause::And(children) => compile_children(model, children).map(CompiledFilter::and),
        WhereClause::Or(children) => compile_children(model, children).map(CompiledFilter::or),
    }
}

fn compile_children(
    model: &ModelDefinition,
    children: &[WhereClause],
) -> QueryResult<Vec<CompiledFilter>> {
    children.iter().map(|c| compile_node(model, c)).collect()
}

fn compile_leaf(
    model: &ModelDefinition,
    property: &str,
    condition: &Condition,
) -> QueryResult<CompiledFilter> {
    if !model.has_property(property) {
        return Err(QueryError::UnknownProperty {
            model: model.name.clone(),
            property: property.to_owned(),
        });
    }
    let field = exact_field(model.physical_name(property));

    Ok(match condition {
        Condition::Eq(v) => CompiledFilter::terms(field, vec![v.clone()]),
        Condition::Neq(v) => CompiledFilter::not(CompiledFilter::terms(field, vec![v.clone()])),
        Condition::Inq(values) => CompiledFilter::terms(field, values.clone()),
        Condition::Like(pattern) => CompiledFilter::wildcard(field, pattern.clone()),
    })
}
