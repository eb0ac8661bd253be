use objstore_http::HttpError;
use objstore_query::QueryError;
use thiserror::Error;

/// Errors returned by connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Filter, schema or record mapping failed before any request was sent.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// A single request failed; the transport error is passed through as is.
    #[error("object store request failed: {0}")]
    Transport(#[from] HttpError),

    /// The bulk edit for a criteria-based update or delete failed.
    ///
    /// `matched` objects were found by the preceding search; how many of them
    /// were edited is unknown.
    #[error("bulk edit of {matched} matched objects failed: {source}")]
    PartialBatchFailure {
        matched: usize,
        #[source]
        source: HttpError,
    },

    /// A criteria-based update or delete matched more objects than one
    /// search page returned; nothing was edited.
    #[error(
        "search matched {total} objects but returned only {fetched}; \
         raise default_page_size to edit them all"
    )]
    TruncatedMatch { total: u64, fetched: usize },

    #[error("invalid connector configuration: {0}")]
    Config(String),

    #[error("unexpected object store response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn partial_batch_failure_keeps_source() {
        let err = ConnectorError::PartialBatchFailure {
            matched: 3,
            source: HttpError::Timeout(std::time::Duration::from_secs(2)),
        };
        assert_eq!(
            err.to_string(),
            "bulk edit of 3 matched objects failed: request timed out after 2s"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn truncated_match_names_both_counts() {
        let err = ConnectorError::TruncatedMatch {
            total: 5,
            fetched: 2,
        };
        assert_eq!(
            err.to_string(),
            "search matched 5 objects but returned only 2; raise default_page_size to edit them all"
        );
    }

    #[test]
    fn query_errors_are_transparent() {
        let err = ConnectorError::from(QueryError::UnknownModel("Ghost".to_owned()));
        assert_eq!(
            err.to_string(),
            QueryError::UnknownModel("Ghost".to_owned()).to_string()
        );
    }
}
