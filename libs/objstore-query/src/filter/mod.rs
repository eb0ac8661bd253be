pub mod ast;
pub mod compile;
pub mod compiled;

pub use ast::{Condition, WhereClause};
pub use compile::{build_where, compile_clause};
pub use compiled::{CompiledFilter, TermsFilter, WildcardFilter};
