use thiserror::Error;

use crate::driver::DriverError;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the query engine.
///
/// Wrapping variants name the stage that failed and keep the driver's (or the
/// extractor's) error as their [`source`](std::error::Error::source).
#[derive(Debug, Error)]
pub enum Error {
    #[error("error opening connection: {0}")]
    ConnectionOpen(#[source] DriverError),
    #[error("error executing query: {0}")]
    QueryExecution(#[source] DriverError),
    #[error("error preparing statement: {0}")]
    StatementPrepare(#[source] DriverError),
    #[error("error executing statement: {0}")]
    StatementExecution(#[source] DriverError),
    #[error("error fetching row: {0}")]
    RowFetch(#[source] DriverError),
    #[error("error extracting row data: {0}")]
    Extract(#[source] DriverError),
    #[error("error reading affected row count: {0}")]
    RowsAffected(#[source] DriverError),
    #[error("error closing connection pool: {0}")]
    PoolClose(#[source] DriverError),
    /// Single-result query returned zero rows.
    #[error("expected a single result but the query returned no rows")]
    NoResults,
    /// Single-result query returned more than one row.
    #[error("expected a single result but the query returned more than one row")]
    NonUniqueResult,
}

/// Where in the execution pipeline a wrapped error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OpenConnection,
    ExecuteQuery,
    PrepareStatement,
    ExecuteStatement,
    FetchRow,
    ExtractRow,
    ReadRowsAffected,
    ClosePool,
}

impl Error {
    /// Stage label for wrapped errors; `None` for the cardinality sentinels.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::ConnectionOpen(_) => Some(Stage::OpenConnection),
            Error::QueryExecution(_) => Some(Stage::ExecuteQuery),
            Error::StatementPrepare(_) => Some(Stage::PrepareStatement),
            Error::StatementExecution(_) => Some(Stage::ExecuteStatement),
            Error::RowFetch(_) => Some(Stage::FetchRow),
            Error::Extract(_) => Some(Stage::ExtractRow),
            Error::RowsAffected(_) => Some(Stage::ReadRowsAffected),
            Error::PoolClose(_) => Some(Stage::ClosePool),
            Error::NoResults | Error::NonUniqueResult => None,
        }
    }

    pub fn is_no_results(&self) -> bool {
        matches!(self, Error::NoResults)
    }

    pub fn is_non_unique(&self) -> bool {
        matches!(self, Error::NonUniqueResult)
    }

    /// The wrapped cause, if this is not a sentinel.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Error::ConnectionOpen(err)
            | Error::QueryExecution(err)
            | Error::StatementPrepare(err)
            | Error::StatementExecution(err)
            | Error::RowFetch(err)
            | Error::Extract(err)
            | Error::RowsAffected(err)
            | Error::PoolClose(err) => Some(err.as_ref()),
            Error::NoResults | Error::NonUniqueResult => None,
        }
    }
}
