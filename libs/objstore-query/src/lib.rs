#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Translation core between ORM-style filters/records and the object store's
//! search and edit payloads.
//!
//! - [`schema`]: model schema table and registry
//! - [`resolver`]: logical ↔ physical property names, ignored fields
//! - [`filter`]: `where` parsing and compilation
//! - [`sort`] / [`fields`]: `order` and `fields` compilation
//! - [`record`]: flat record ↔ remote object mapping
//! - [`key`]: content-addressed primary keys
//!
//! Everything here is pure and synchronous.

pub mod compiler;
pub mod error;
pub mod fields;
pub mod filter;
pub mod key;
pub mod record;
pub mod resolver;
pub mod schema;
pub mod sort;

pub use compiler::{CompiledQuery, Filter, ModelCompiler};
pub use error::{QueryError, QueryResult};
pub use fields::FieldsSpec;
pub use filter::{CompiledFilter, Condition, WhereClause};
pub use key::{KeyDerivation, KeyHash};
pub use record::RemoteObject;
pub use resolver::{EXACT_MATCH_SUFFIX, Record, STANDARD_PROPERTIES, is_standard_property};
pub use schema::{ModelDefinition, PropertyDescriptor, SchemaRegistry};
pub use sort::{OrderSpec, SortDir, SortKey};
