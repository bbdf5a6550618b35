//! Error types for the query crate.

/// Errors that can occur while building a query.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    /// The sort key is not one of the supported orderings.
    #[error("unknown sort key {0:?} (expected name, serving_asc, serving_desc, time_asc or time_desc)")]
    UnknownSort(String),
}

/// Convenience alias for query results.
pub type QueryResult<T> = Result<T, QueryError>;
