//! Row and statement records plus the extraction callback contract.

use crate::value::{Metadata, Params, Value};

/// One decoded record from a query result stream.
///
/// A `Row` is handed to the [`RowExtractor`] by reference and is only valid
/// for the duration of that call.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Field values in the order the query returns them.
    pub data: Vec<Value>,
    /// Metadata the server attached to this record.
    pub meta: Metadata,
    /// Zero-based position of this row within the current query's stream.
    pub index: usize,
}

impl Row {
    /// Field at `column`, if present.
    pub fn get(&self, column: usize) -> Option<&Value> {
        self.data.get(column)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Caller-supplied decoding logic invoked once per fetched row.
///
/// Returning an error stops iteration immediately; no further rows are
/// fetched. Any closure `FnMut(&Row) -> anyhow::Result<()>` is an extractor.
pub trait RowExtractor {
    fn extract(&mut self, row: &Row) -> anyhow::Result<()>;
}

impl<F> RowExtractor for F
where
    F: FnMut(&Row) -> anyhow::Result<()>,
{
    fn extract(&mut self, row: &Row) -> anyhow::Result<()> {
        self(row)
    }
}

/// Outcome of a write statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateResult {
    pub rows_affected: i64,
    /// Best effort: zero when the driver cannot report it.
    pub last_insert_id: i64,
    pub metadata: Metadata,
}

/// Query text plus parameters for a write statement.
///
/// An empty query is a valid no-op so callers can build conditional
/// statement chains without branching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub query: String,
    pub params: Params,
}

impl Statement {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Params::new(),
        }
    }

    /// Add or replace a named parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }
}
