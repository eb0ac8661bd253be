use thiserror::Error;

/// Errors produced while translating ORM filters and records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("'{operator}' operator is not supported")]
    UnsupportedOperator { operator: String },

    #[error("invalid where filter: {0}")]
    InvalidFilter(String),

    #[error("unknown property '{property}' on model '{model}'")]
    UnknownProperty { model: String, property: String },

    #[error("invalid order expression: {0}")]
    InvalidOrder(String),

    #[error("model '{model}' has no property flagged as primary key")]
    MissingPrimaryKeyConfiguration { model: String },

    #[error("model '{model}' has no property flagged as unique")]
    MissingUniqueProperty { model: String },

    #[error("unique property '{property}' of model '{model}' has no value")]
    MissingUniqueValue { model: String, property: String },

    #[error("invalid model definition: {0}")]
    InvalidModelDefinition(String),

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("invalid remote object: {0}")]
    InvalidRemoteObject(String),
}

pub type QueryResult<T> = Result<T, QueryError>;
