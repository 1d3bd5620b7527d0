//! Scripted driver doubles that record every call made into them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::driver::{
    Closeable, Connection, ConnectionPool, Cursor, DriverError, ExecResult, PreparedStatement,
    Record,
};
use crate::value::{Metadata, Params, Value};

/// Calls observed across the pool and every handle it hands out.
#[derive(Debug, Default)]
pub(crate) struct Calls {
    pub acquire: usize,
    pub pool_close: usize,
    pub run_query: Vec<(String, Params)>,
    pub prepare: Vec<String>,
    pub execute: Vec<Params>,
    pub fetch_next: usize,
    pub cursor_close: usize,
    pub statement_close: usize,
    pub connection_close: usize,
    /// Handle kinds in the order they were closed.
    pub close_order: Vec<&'static str>,
}

/// What each collaborator should answer. `None` errors mean success.
#[derive(Debug, Clone)]
pub(crate) struct Script {
    pub acquire_error: Option<String>,
    pub query_error: Option<String>,
    pub prepare_error: Option<String>,
    pub execute_error: Option<String>,
    /// Fetched in order; end-of-stream once exhausted.
    pub rows: Vec<std::result::Result<Record, String>>,
    pub rows_affected: std::result::Result<i64, String>,
    pub last_insert_id: std::result::Result<i64, String>,
    pub metadata: Metadata,
    pub cursor_close_error: Option<String>,
    pub connection_close_error: Option<String>,
    pub pool_close_error: Option<String>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            acquire_error: None,
            query_error: None,
            prepare_error: None,
            execute_error: None,
            rows: Vec::new(),
            rows_affected: Ok(0),
            last_insert_id: Ok(0),
            metadata: Metadata::new(),
            cursor_close_error: None,
            connection_close_error: None,
            pool_close_error: None,
        }
    }
}

impl Script {
    pub fn with_rows(rows: Vec<Record>) -> Self {
        Self {
            rows: rows.into_iter().map(Ok).collect(),
            ..Self::default()
        }
    }
}

pub(crate) fn record(fields: Vec<Value>) -> Record {
    Record {
        fields,
        meta: Metadata::from([("key".to_string(), Value::from("value"))]),
    }
}

#[derive(Clone, Default)]
pub(crate) struct Recorder(Arc<Mutex<Calls>>);

impl Recorder {
    pub fn calls(&self) -> MutexGuard<'_, Calls> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn fail(message: &Option<String>) -> Result<(), DriverError> {
    match message {
        Some(msg) => Err(msg.clone().into()),
        None => Ok(()),
    }
}

pub(crate) struct ScriptedPool {
    script: Script,
    recorder: Recorder,
}

impl ScriptedPool {
    pub fn new(script: Script) -> (Self, Recorder) {
        let recorder = Recorder::default();
        let pool = Self {
            script,
            recorder: recorder.clone(),
        };
        (pool, recorder)
    }
}

impl ConnectionPool for ScriptedPool {
    type Connection = ScriptedConnection;

    fn acquire(&self) -> Result<ScriptedConnection, DriverError> {
        self.recorder.calls().acquire += 1;
        fail(&self.script.acquire_error)?;
        Ok(ScriptedConnection {
            script: self.script.clone(),
            recorder: self.recorder.clone(),
        })
    }

    fn close(&self) -> Result<(), DriverError> {
        self.recorder.calls().pool_close += 1;
        fail(&self.script.pool_close_error)
    }
}

pub(crate) struct ScriptedConnection {
    script: Script,
    recorder: Recorder,
}

impl Closeable for ScriptedConnection {
    fn close(&mut self) -> Result<(), DriverError> {
        let mut calls = self.recorder.calls();
        calls.connection_close += 1;
        calls.close_order.push("connection");
        fail(&self.script.connection_close_error)
    }
}

impl Connection for ScriptedConnection {
    type Cursor = ScriptedCursor;
    type Statement = ScriptedStatement;

    fn run_query(&mut self, query: &str, params: &Params) -> Result<ScriptedCursor, DriverError> {
        self.recorder
            .calls()
            .run_query
            .push((query.to_string(), params.clone()));
        fail(&self.script.query_error)?;
        Ok(ScriptedCursor {
            rows: self.script.rows.clone().into(),
            close_error: self.script.cursor_close_error.clone(),
            recorder: self.recorder.clone(),
        })
    }

    fn prepare(&mut self, query: &str) -> Result<ScriptedStatement, DriverError> {
        self.recorder.calls().prepare.push(query.to_string());
        fail(&self.script.prepare_error)?;
        Ok(ScriptedStatement {
            script: self.script.clone(),
            recorder: self.recorder.clone(),
        })
    }
}

pub(crate) struct ScriptedCursor {
    rows: VecDeque<std::result::Result<Record, String>>,
    close_error: Option<String>,
    recorder: Recorder,
}

impl Closeable for ScriptedCursor {
    fn close(&mut self) -> Result<(), DriverError> {
        let mut calls = self.recorder.calls();
        calls.cursor_close += 1;
        calls.close_order.push("cursor");
        fail(&self.close_error)
    }
}

impl Cursor for ScriptedCursor {
    fn fetch_next(&mut self) -> Result<Option<Record>, DriverError> {
        self.recorder.calls().fetch_next += 1;
        match self.rows.pop_front() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(msg)) => Err(msg.into()),
            None => Ok(None),
        }
    }
}

pub(crate) struct ScriptedStatement {
    script: Script,
    recorder: Recorder,
}

impl Closeable for ScriptedStatement {
    fn close(&mut self) -> Result<(), DriverError> {
        let mut calls = self.recorder.calls();
        calls.statement_close += 1;
        calls.close_order.push("statement");
        Ok(())
    }
}

impl PreparedStatement for ScriptedStatement {
    type Output = ScriptedResult;

    fn execute(&mut self, params: &Params) -> Result<ScriptedResult, DriverError> {
        self.recorder.calls().execute.push(params.clone());
        fail(&self.script.execute_error)?;
        Ok(ScriptedResult {
            script: self.script.clone(),
        })
    }
}

pub(crate) struct ScriptedResult {
    script: Script,
}

impl ExecResult for ScriptedResult {
    fn rows_affected(&self) -> Result<i64, DriverError> {
        self.script.rows_affected.clone().map_err(Into::into)
    }

    fn last_insert_id(&self) -> Result<i64, DriverError> {
        self.script.last_insert_id.clone().map_err(Into::into)
    }

    fn metadata(&self) -> Metadata {
        self.script.metadata.clone()
    }
}

/// Route engine logs to the test harness output.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .compact()
        .try_init();
}
