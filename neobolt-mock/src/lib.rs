//! Recording [`GraphDb`] double for testing code that depends on neobolt.
//!
//! Each operation is scripted per call: the first `query_for_result` call
//! gets the first scripted response, the second call the second, and so on.
//! Every call records the query text and a copy of its parameters.
//!
//! ## Example
//!
//! ```rust,ignore
//! use neobolt::{GraphDb, Params, Row, Value};
//! use neobolt_mock::MockDb;
//!
//! let db = MockDb::new().query_for_result_yields(vec![Value::Integer(1)]);
//! let mut count = 0;
//! db.query_for_result("MATCH (n) RETURN count(*)", &Params::new(), &mut |row: &Row| -> anyhow::Result<()> {
//!     count = row.get(0).and_then(|v| v.as_i64()).unwrap_or_default();
//!     Ok(())
//! })?;
//! assert_eq!(db.query_for_result_calls().len(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use neobolt::{
    Error, GraphDb, Metadata, Params, Result, Row, RowExtractor, Statement, UpdateResult, Value,
};

type QueryHandler = Box<dyn FnOnce(&str, &Params, &mut dyn RowExtractor) -> Result<()> + Send>;
type ExecHandler = Box<dyn FnOnce(&Statement) -> Result<UpdateResult> + Send>;
type CloseHandler = Box<dyn FnOnce() -> Result<()> + Send>;

/// Arguments captured from one query call.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCall {
    pub query: String,
    pub params: Params,
}

struct Script<H, C> {
    handlers: Vec<Option<H>>,
    calls: Vec<C>,
}

impl<H, C> Default for Script<H, C> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
            calls: Vec::new(),
        }
    }
}

impl<H, C> Script<H, C> {
    /// Record the call and hand back the response scripted for its index.
    fn next(&mut self, call: C) -> (usize, Option<H>) {
        let index = self.calls.len();
        self.calls.push(call);
        let handler = self.handlers.get_mut(index).and_then(Option::take);
        (index, handler)
    }
}

#[derive(Default)]
struct MockState {
    query_for_result: Script<QueryHandler, QueryCall>,
    query_for_results: Script<QueryHandler, QueryCall>,
    exec: Script<ExecHandler, Statement>,
    close: Script<CloseHandler, ()>,
}

/// Scripted stand-in for a [`neobolt::QueryEngine`].
#[derive(Default)]
pub struct MockDb {
    state: Mutex<MockState>,
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Script the next `query_for_result` call.
    pub fn on_query_for_result<F>(self, handler: F) -> Self
    where
        F: FnOnce(&str, &Params, &mut dyn RowExtractor) -> Result<()> + Send + 'static,
    {
        self.state()
            .query_for_result
            .handlers
            .push(Some(Box::new(handler)));
        self
    }

    pub fn query_for_result_returns(self, result: Result<()>) -> Self {
        self.on_query_for_result(move |_, _, _| result)
    }

    /// Feed a single row with `data` to the caller's extractor.
    pub fn query_for_result_yields(self, data: Vec<Value>) -> Self {
        self.on_query_for_result(move |_, _, extractor| feed(vec![data], extractor))
    }

    /// Script the next `query_for_results` call.
    pub fn on_query_for_results<F>(self, handler: F) -> Self
    where
        F: FnOnce(&str, &Params, &mut dyn RowExtractor) -> Result<()> + Send + 'static,
    {
        self.state()
            .query_for_results
            .handlers
            .push(Some(Box::new(handler)));
        self
    }

    pub fn query_for_results_returns(self, result: Result<()>) -> Self {
        self.on_query_for_results(move |_, _, _| result)
    }

    /// Feed `rows` to the caller's extractor in order, indexed from zero.
    pub fn query_for_results_yields(self, rows: Vec<Vec<Value>>) -> Self {
        self.on_query_for_results(move |_, _, extractor| feed(rows, extractor))
    }

    /// Script the next `exec` call.
    pub fn on_exec<F>(self, handler: F) -> Self
    where
        F: FnOnce(&Statement) -> Result<UpdateResult> + Send + 'static,
    {
        self.state().exec.handlers.push(Some(Box::new(handler)));
        self
    }

    pub fn exec_returns(self, result: Result<UpdateResult>) -> Self {
        self.on_exec(move |_| result)
    }

    /// Script the next `close` call. Unscripted closes succeed.
    pub fn on_close<F>(self, handler: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.state().close.handlers.push(Some(Box::new(handler)));
        self
    }

    pub fn close_returns(self, result: Result<()>) -> Self {
        self.on_close(move || result)
    }

    pub fn query_for_result_calls(&self) -> Vec<QueryCall> {
        self.state().query_for_result.calls.clone()
    }

    pub fn query_for_results_calls(&self) -> Vec<QueryCall> {
        self.state().query_for_results.calls.clone()
    }

    pub fn exec_calls(&self) -> Vec<Statement> {
        self.state().exec.calls.clone()
    }

    pub fn close_calls(&self) -> usize {
        self.state().close.calls.len()
    }
}

fn feed(rows: Vec<Vec<Value>>, extractor: &mut dyn RowExtractor) -> Result<()> {
    for (index, data) in rows.into_iter().enumerate() {
        let row = Row {
            data,
            meta: Metadata::new(),
            index,
        };
        extractor
            .extract(&row)
            .map_err(|err| Error::Extract(err.into()))?;
    }
    Ok(())
}

fn query_call(query: &str, params: &Params) -> QueryCall {
    QueryCall {
        query: query.to_string(),
        params: params.clone(),
    }
}

impl GraphDb for MockDb {
    fn query_for_result(
        &self,
        query: &str,
        params: &Params,
        extractor: &mut dyn RowExtractor,
    ) -> Result<()> {
        let (index, handler) = self
            .state()
            .query_for_result
            .next(query_call(query, params));
        match handler {
            Some(handler) => handler(query, params, extractor),
            None => panic!("MockDb: no scripted response for query_for_result call #{index}"),
        }
    }

    fn query_for_results(
        &self,
        query: &str,
        params: &Params,
        extractor: &mut dyn RowExtractor,
    ) -> Result<()> {
        let (index, handler) = self
            .state()
            .query_for_results
            .next(query_call(query, params));
        match handler {
            Some(handler) => handler(query, params, extractor),
            None => panic!("MockDb: no scripted response for query_for_results call #{index}"),
        }
    }

    fn exec(&self, statement: &Statement) -> Result<UpdateResult> {
        let (index, handler) = self.state().exec.next(statement.clone());
        match handler {
            Some(handler) => handler(statement),
            None => panic!("MockDb: no scripted response for exec call #{index}"),
        }
    }

    fn close(&self) -> Result<()> {
        let (_, handler) = self.state().close.next(());
        match handler {
            Some(handler) => handler(),
            None => Ok(()),
        }
    }
}
