//! Pooled query and statement execution for Bolt graph databases.
//!
//! The [`QueryEngine`] borrows a connection from a [`ConnectionPool`], runs a
//! Cypher query or statement, feeds each result row to a caller-supplied
//! [`RowExtractor`], and releases the cursor and connection before returning
//! on every path.
//!
//! ## Example
//!
//! ```rust,ignore
//! use neobolt::{ManagedPool, Params, PoolConfig, QueryEngine, Row};
//!
//! let pool = ManagedPool::new(manager, &PoolConfig::load()?)?;
//! let db = QueryEngine::new(pool);
//!
//! let mut count = 0;
//! db.query_for_result(
//!     "MATCH (cl:_code_list) RETURN count(*)",
//!     &Params::new(),
//!     &mut |row: &Row| -> anyhow::Result<()> {
//!         count = row.get(0).and_then(|v| v.as_i64()).unwrap_or_default();
//!         Ok(())
//!     },
//! )?;
//! db.close()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod db;
pub mod driver;
pub mod engine;
pub mod error;
pub mod guard;
pub mod pool;
pub mod row;
pub mod value;

#[cfg(test)]
mod testing;

pub use config::PoolConfig;
pub use db::GraphDb;
pub use driver::{
    Closeable, Connection, ConnectionPool, Cursor, DriverError, ExecResult, PreparedStatement,
    Record,
};
pub use engine::QueryEngine;
pub use error::{Error, Result, Stage};
pub use pool::{ManagedPool, PooledConnection};
pub use row::{Row, RowExtractor, Statement, UpdateResult};
pub use value::{Metadata, Node, Params, Relationship, Value};
