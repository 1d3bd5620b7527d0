use crate::driver::ConnectionPool;
use crate::engine::QueryEngine;
use crate::error::Result;
use crate::row::{RowExtractor, Statement, UpdateResult};
use crate::value::Params;

/// The engine's public surface as an object-safe trait.
///
/// Application code can depend on `dyn GraphDb` and swap in a recording
/// double (see the `neobolt-mock` crate) under test.
pub trait GraphDb: Send + Sync {
    fn query_for_result(
        &self,
        query: &str,
        params: &Params,
        extractor: &mut dyn RowExtractor,
    ) -> Result<()>;

    fn query_for_results(
        &self,
        query: &str,
        params: &Params,
        extractor: &mut dyn RowExtractor,
    ) -> Result<()>;

    fn exec(&self, statement: &Statement) -> Result<UpdateResult>;

    fn close(&self) -> Result<()>;
}

impl<P: ConnectionPool> GraphDb for QueryEngine<P> {
    fn query_for_result(
        &self,
        query: &str,
        params: &Params,
        extractor: &mut dyn RowExtractor,
    ) -> Result<()> {
        QueryEngine::query_for_result(self, query, params, extractor)
    }

    fn query_for_results(
        &self,
        query: &str,
        params: &Params,
        extractor: &mut dyn RowExtractor,
    ) -> Result<()> {
        QueryEngine::query_for_results(self, query, params, extractor)
    }

    fn exec(&self, statement: &Statement) -> Result<UpdateResult> {
        QueryEngine::exec(self, statement)
    }

    fn close(&self) -> Result<()> {
        QueryEngine::close(self)
    }
}
