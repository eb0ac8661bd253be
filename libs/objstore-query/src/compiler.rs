//! Capability interface consumed by connectors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryResult;
use crate::fields::{FieldsSpec, compile_fields};
use crate::filter::{CompiledFilter, build_where};
use crate::record::{RemoteObject, to_instance, to_remote_properties};
use crate::resolver::Record;
use crate::schema::ModelDefinition;
use crate::sort::{OrderSpec, SortKey, compile_order};

/// The ORM's `{where, order, fields, limit}` query descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldsSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Everything a search request needs, in remote terms.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledQuery {
    pub filter: CompiledFilter,
    pub sort: Vec<SortKey>,
    /// Physical names; empty means all properties.
    pub property_selector: Vec<String>,
    pub limit: Option<u32>,
}

pub trait ModelCompiler {
    /// # Errors
    /// Malformed or unsupported `where` shapes.
    fn compile_where(&self, raw: &Value) -> QueryResult<CompiledFilter>;

    /// # Errors
    /// Blank sort expressions.
    fn compile_order(&self, order: &OrderSpec) -> QueryResult<Vec<SortKey>>;

    fn compile_fields(&self, fields: Option<&FieldsSpec>) -> Vec<String>;

    fn to_remote_properties(&self, data: &Record) -> Record;

    fn to_instance(&self, remote: Option<&RemoteObject>, whitelist: &[String]) -> Option<Record>;

    /// # Errors
    /// Any error of [`compile_where`](Self::compile_where) or
    /// [`compile_order`](Self::compile_order).
    fn compile_filter(&self, filter: &Filter) -> QueryResult<CompiledQuery> {
        let filter_expr = match &filter.r#where {
            Some(raw) => self.compile_where(raw)?,
            None => CompiledFilter::match_all(),
        };
        let sort = match &filter.order {
            Some(order) => self.compile_order(order)?,
            None => Vec::new(),
        };
        Ok(CompiledQuery {
            filter: filter_expr,
            sort,
            property_selector: self.compile_fields(filter.fields.as_ref()),
            limit: filter.limit,
        })
    }
}

impl ModelCompiler for ModelDefinition {
    fn compile_where(&self, raw: &Value) -> QueryResult<CompiledFilter> {
        build_where(self, raw)
    }

    fn compile_order(&self, order: &OrderSpec) -> QueryResult<Vec<SortKey>> {
        compile_order(self, order)
    }

    fn compile_fields(&self, fields: Option<&FieldsSpec>) -> Vec<String> {
        compile_fields(self, fields)
    }

    fn to_remote_properties(&self, data: &Record) -> Record {
        to_remote_properties(self, data)
    }

    fn to_instance(&self, remote: Option<&RemoteObject>, whitelist: &[String]) -> Option<Record> {
        to_instance(self, remote, whitelist)
    }
}
