//! r2d2-backed [`ConnectionPool`] for any driver connection.
//!
//! Drivers implement [`r2d2::ManageConnection`] for their raw connection type
//! and [`Connection`] for the connection itself; `ManagedPool` turns that into
//! something the [`QueryEngine`](crate::engine::QueryEngine) can borrow from.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use r2d2::{ManageConnection, Pool};
use tracing::{debug, info, instrument};

use crate::config::PoolConfig;
use crate::driver::{Closeable, Connection, ConnectionPool, DriverError};
use crate::value::Params;

/// Pool of driver connections managed by r2d2.
pub struct ManagedPool<M: ManageConnection> {
    pool: Pool<M>,
    closed: AtomicBool,
}

impl<M> ManagedPool<M>
where
    M: ManageConnection,
    M::Connection: Connection,
{
    /// Build a pool from configuration, opening the initial idle connections.
    #[instrument(skip(manager, config))]
    pub fn new(manager: M, config: &PoolConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(Duration::from_millis(config.acquire_timeout_ms))
            .idle_timeout(config.idle_timeout_ms.map(Duration::from_millis))
            .test_on_check_out(config.test_on_check_out)
            .build(manager)
            .with_context(|| "failed to build connection pool")?;

        info!(
            max_size = config.max_size,
            acquire_timeout_ms = config.acquire_timeout_ms,
            "connection pool initialized"
        );
        Ok(Self {
            pool,
            closed: AtomicBool::new(false),
        })
    }

    /// Current r2d2 connection counts.
    pub fn state(&self) -> r2d2::State {
        self.pool.state()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl<M> ConnectionPool for ManagedPool<M>
where
    M: ManageConnection,
    M::Connection: Connection,
{
    type Connection = PooledConnection<M>;

    fn acquire(&self) -> Result<PooledConnection<M>, DriverError> {
        if self.is_closed() {
            return Err("connection pool is closed".into());
        }
        let conn = self.pool.get()?;
        Ok(PooledConnection { inner: Some(conn) })
    }

    fn close(&self) -> Result<(), DriverError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            debug!("connection pool already closed");
        } else {
            info!("connection pool closed");
        }
        Ok(())
    }
}

/// A connection checked out of a [`ManagedPool`].
///
/// Closing it hands the connection back to the pool; the driver connection
/// itself stays open for the next borrower.
pub struct PooledConnection<M: ManageConnection> {
    inner: Option<r2d2::PooledConnection<M>>,
}

impl<M> PooledConnection<M>
where
    M: ManageConnection,
{
    fn live(&mut self) -> Result<&mut M::Connection, DriverError> {
        self.inner
            .as_deref_mut()
            .ok_or_else(|| "connection already returned to the pool".into())
    }
}

impl<M> Closeable for PooledConnection<M>
where
    M: ManageConnection,
{
    fn close(&mut self) -> Result<(), DriverError> {
        // Dropping the r2d2 guard returns the connection.
        drop(self.inner.take());
        Ok(())
    }
}

impl<M> Connection for PooledConnection<M>
where
    M: ManageConnection,
    M::Connection: Connection,
{
    type Cursor = <M::Connection as Connection>::Cursor;
    type Statement = <M::Connection as Connection>::Statement;

    fn run_query(&mut self, query: &str, params: &Params) -> Result<Self::Cursor, DriverError> {
        self.live()?.run_query(query, params)
    }

    fn prepare(&mut self, query: &str) -> Result<Self::Statement, DriverError> {
        self.live()?.prepare(query)
    }
}
