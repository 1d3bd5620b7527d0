//! Contracts the engine consumes from the underlying Bolt driver.
//!
//! The engine never talks to the network itself. A driver (or the r2d2
//! adapter in [`crate::pool`]) supplies connections, cursors, and prepared
//! statements through these traits.

use crate::value::{Metadata, Params, Value};

/// Error type reported by driver collaborators.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A raw record produced by a cursor before the engine assigns its index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub fields: Vec<Value>,
    pub meta: Metadata,
}

/// A handle that must be released once its owner is done with it.
pub trait Closeable {
    fn close(&mut self) -> Result<(), DriverError>;
}

/// Supplies connection handles on demand. Shared between concurrent callers.
pub trait ConnectionPool: Send + Sync {
    type Connection: Connection;

    fn acquire(&self) -> Result<Self::Connection, DriverError>;

    fn close(&self) -> Result<(), DriverError>;
}

/// A single borrowed connection.
pub trait Connection: Closeable {
    type Cursor: Cursor;
    type Statement: PreparedStatement;

    /// Run a read query and return a cursor over its rows.
    fn run_query(&mut self, query: &str, params: &Params) -> Result<Self::Cursor, DriverError>;

    fn prepare(&mut self, query: &str) -> Result<Self::Statement, DriverError>;
}

/// Lazily yields the rows of one query.
pub trait Cursor: Closeable {
    /// Fetch the next record.
    ///
    /// `Ok(None)` is end-of-stream and is not an error.
    fn fetch_next(&mut self) -> Result<Option<Record>, DriverError>;
}

pub trait PreparedStatement: Closeable {
    type Output: ExecResult;

    fn execute(&mut self, params: &Params) -> Result<Self::Output, DriverError>;
}

/// Summary of an executed write statement.
pub trait ExecResult {
    fn rows_affected(&self) -> Result<i64, DriverError>;

    fn last_insert_id(&self) -> Result<i64, DriverError>;

    fn metadata(&self) -> Metadata;
}
