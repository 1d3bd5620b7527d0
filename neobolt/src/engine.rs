//! Query and statement execution against a pooled connection.
//!
//! Every call borrows one connection for its whole duration and releases it
//! (and any cursor or prepared statement) before returning, whichever branch
//! ends the call. Nothing is retried: the first failure is surfaced.

use tracing::{debug, error, instrument, warn};

use crate::driver::{Connection, ConnectionPool, Cursor, ExecResult, PreparedStatement};
use crate::error::{Error, Result};
use crate::guard::Scoped;
use crate::row::{Row, RowExtractor, Statement, UpdateResult};
use crate::value::Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cardinality {
    Single,
    Many,
}

/// Runs queries and statements on connections borrowed from `P`.
pub struct QueryEngine<P: ConnectionPool> {
    pool: P,
}

impl<P: ConnectionPool> QueryEngine<P> {
    pub fn new(pool: P) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Run a query expected to yield exactly one row.
    ///
    /// Returns [`Error::NoResults`] for an empty stream. A second row is
    /// fetched to detect non-uniqueness and yields [`Error::NonUniqueResult`]
    /// without being passed to the extractor.
    #[instrument(skip(self, params, extractor), fields(query = %query))]
    pub fn query_for_result(
        &self,
        query: &str,
        params: &Params,
        extractor: &mut dyn RowExtractor,
    ) -> Result<()> {
        self.query(query, params, extractor, Cardinality::Single)
    }

    /// Run a query and hand every row to the extractor in stream order.
    ///
    /// Zero rows is a success.
    #[instrument(skip(self, params, extractor), fields(query = %query))]
    pub fn query_for_results(
        &self,
        query: &str,
        params: &Params,
        extractor: &mut dyn RowExtractor,
    ) -> Result<()> {
        self.query(query, params, extractor, Cardinality::Many)
    }

    /// Execute a write statement on a fresh connection.
    ///
    /// An empty query is a no-op that never touches the pool.
    #[instrument(skip(self, statement), fields(query = %statement.query))]
    pub fn exec(&self, statement: &Statement) -> Result<UpdateResult> {
        if statement.is_empty() {
            debug!("empty statement, nothing to execute");
            return Ok(UpdateResult::default());
        }

        let mut conn = self.open_connection()?;
        let prepared = conn
            .prepare(&statement.query)
            .map_err(Error::StatementPrepare)?;
        let mut prepared = Scoped::new("statement", prepared);
        let result = prepared
            .execute(&statement.params)
            .map_err(Error::StatementExecution)?;

        // The write has already happened; a missing count is a reporting failure.
        let rows_affected = result.rows_affected().map_err(Error::RowsAffected)?;
        let last_insert_id = result.last_insert_id().unwrap_or_else(|err| {
            warn!(error = %err, "last inserted id unavailable");
            0
        });
        let metadata = result.metadata();

        debug!(rows_affected, last_insert_id, "executed statement");
        Ok(UpdateResult {
            rows_affected,
            last_insert_id,
            metadata,
        })
    }

    /// Close the underlying pool.
    pub fn close(&self) -> Result<()> {
        self.pool.close().map_err(Error::PoolClose)
    }

    fn open_connection(&self) -> Result<Scoped<P::Connection>> {
        match self.pool.acquire() {
            Ok(conn) => Ok(Scoped::new("connection", conn)),
            Err(err) => {
                error!(error = %err, "error opening connection");
                Err(Error::ConnectionOpen(err))
            }
        }
    }

    fn query(
        &self,
        query: &str,
        params: &Params,
        extractor: &mut dyn RowExtractor,
        cardinality: Cardinality,
    ) -> Result<()> {
        let mut conn = self.open_connection()?;
        let cursor = conn
            .run_query(query, params)
            .map_err(Error::QueryExecution)?;
        // Declared after `conn`, so dropped (closed) before it.
        let mut cursor = Scoped::new("cursor", cursor);
        extract_rows(&mut *cursor, extractor, cardinality)
    }
}

fn extract_rows<C: Cursor>(
    cursor: &mut C,
    extractor: &mut dyn RowExtractor,
    cardinality: Cardinality,
) -> Result<()> {
    let mut index = 0usize;
    loop {
        let record = match cursor.fetch_next() {
            Ok(Some(record)) => record,
            Ok(None) => break,
            Err(err) => {
                error!(index, error = %err, "row error, breaking loop");
                return Err(Error::RowFetch(err));
            }
        };
        if cardinality == Cardinality::Single && index > 0 {
            return Err(Error::NonUniqueResult);
        }
        let row = Row {
            data: record.fields,
            meta: record.meta,
            index,
        };
        extractor
            .extract(&row)
            .map_err(|err| Error::Extract(err.into()))?;
        index += 1;
    }

    debug!(rows = index, "reached end of result rows");
    if cardinality == Cardinality::Single && index == 0 {
        return Err(Error::NoResults);
    }
    Ok(())
}
