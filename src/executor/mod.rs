/// Query execution engine
///
/// Executes the list/cluster query pair of one `SearchQueryPackage` against
/// the bean's data source, optionally inside a single read-only transaction
/// so both queries observe the same snapshot, and hands back a closeable
/// `ExecutionResult` owning the connection and the open cursors.

pub mod package;
pub mod result;

pub use package::SearchQueryPackage;
pub use result::ExecutionResult;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::SearcherConfig;
use crate::core::{SearchError, SearchResult, Value};
use crate::source::{Connection, DataSourceRegistry, IsolationLevel, RowCursor, Statement};

use result::{ClusterHandle, ListHandle};

const DEFAULT_SLOW_SQL_THRESHOLD: Duration = Duration::from_millis(1000);

pub struct SqlExecutor {
    sources: Arc<DataSourceRegistry>,
    /// Run both queries inside one read-only transaction.
    transactional: bool,
    isolation: IsolationLevel,
    /// Statements at or above this elapsed time are observed as slow.
    slow_sql_threshold: Duration,
}

impl SqlExecutor {
    #[must_use]
    pub fn new(sources: Arc<DataSourceRegistry>) -> Self {
        Self {
            sources,
            transactional: false,
            isolation: IsolationLevel::default(),
            slow_sql_threshold: DEFAULT_SLOW_SQL_THRESHOLD,
        }
    }

    /// Builds an executor from a loaded configuration.
    pub fn from_config(sources: Arc<DataSourceRegistry>, config: &SearcherConfig) -> SearchResult<Self> {
        let mut executor = Self::new(sources);
        executor.transactional = config.transactional;
        executor.isolation = config.isolation_level()?;
        executor.slow_sql_threshold = Duration::from_millis(config.slow_sql_threshold_ms);
        Ok(executor)
    }

    pub fn set_transactional(&mut self, transactional: bool) {
        self.transactional = transactional;
    }

    /// Only effective when transactional mode is on.
    pub fn set_transaction_isolation(&mut self, level: IsolationLevel) {
        self.isolation = level;
    }

    pub fn set_slow_sql_threshold(&mut self, threshold: Duration) {
        self.slow_sql_threshold = threshold;
    }

    /// Executes the requested queries and returns the combined result.
    ///
    /// A request with neither query flag set returns an already-closed empty
    /// result without touching any data source. On any failure after the
    /// connection was acquired, the connection is closed here before the
    /// error propagates; on success it is released by
    /// `ExecutionResult::close`.
    pub fn execute(&self, package: &SearchQueryPackage) -> SearchResult<ExecutionResult> {
        if !package.needs_list_query && !package.needs_cluster_query {
            return Ok(ExecutionResult::empty());
        }
        let source = self
            .sources
            .resolve(package.bean.data_source.as_deref(), &package.bean.name)?;
        let mut connection = source.get_connection().map_err(|err| {
            SearchError::Connection(format!(
                "Can not get connection from data source for bean '{}': {err}",
                package.bean.name
            ))
        })?;
        match self.do_execute(package, connection.as_mut()) {
            Ok((list, cluster)) => Ok(ExecutionResult::open(connection, list, cluster)),
            Err(err) => {
                // failed mid-flight: release the connection now instead of
                // handing it to a result nobody will close
                let _ = connection.close();
                Err(err)
            }
        }
    }

    fn do_execute(
        &self,
        package: &SearchQueryPackage,
        connection: &mut dyn Connection,
    ) -> SearchResult<(Option<ListHandle>, Option<ClusterHandle>)> {
        if self.transactional {
            connection.set_auto_commit(false)?;
            connection.set_transaction_isolation(self.isolation)?;
            connection.set_read_only(true)?;
        }
        let mut list = None;
        let mut cluster = None;
        let mut failure = self
            .run_queries(package, connection, &mut list, &mut cluster)
            .err();
        if self.transactional {
            // cleanup phase: commit runs whether or not the queries
            // succeeded, but a commit failure never masks an execution one
            let committed = connection
                .commit()
                .and_then(|()| connection.set_read_only(false));
            if failure.is_none() {
                failure = committed.err();
            }
        }
        if let Some(err) = failure {
            if let Some(handle) = list.take() {
                discard(handle.cursor, handle.statement);
            }
            if let Some(handle) = cluster.take() {
                discard(handle.cursor, handle.statement);
            }
            return Err(err);
        }
        Ok((list, cluster))
    }

    fn run_queries(
        &self,
        package: &SearchQueryPackage,
        connection: &mut dyn Connection,
        list: &mut Option<ListHandle>,
        cluster: &mut Option<ClusterHandle>,
    ) -> SearchResult<()> {
        if package.needs_list_query {
            let (statement, cursor) = self.run_query(
                connection,
                &package.list_sql,
                &package.list_params,
                &package.bean.name,
            )?;
            *list = Some(ListHandle { statement, cursor });
        }
        if package.needs_cluster_query {
            let (statement, mut cursor) = self.run_query(
                connection,
                &package.cluster_sql,
                &package.cluster_params,
                &package.bean.name,
            )?;
            // zero rows is a valid cluster outcome; remember which it was
            let has_row = match cursor.next() {
                Ok(has_row) => has_row,
                Err(err) => {
                    discard(cursor, statement);
                    return Err(err);
                }
            };
            *cluster = Some(ClusterHandle { statement, cursor, has_row });
        }
        Ok(())
    }

    fn run_query(
        &self,
        connection: &mut dyn Connection,
        sql: &str,
        params: &[Value],
        bean: &str,
    ) -> SearchResult<(Box<dyn Statement>, Box<dyn RowCursor>)> {
        let mut statement = connection.prepare(sql)?;
        for (index, param) in params.iter().enumerate() {
            if let Err(err) = statement.bind(index + 1, param.clone()) {
                let _ = statement.close();
                return Err(err);
            }
        }
        let started = Instant::now();
        let outcome = statement.execute_query();
        self.observe(bean, sql, params, started.elapsed());
        match outcome {
            Ok(cursor) => Ok((statement, cursor)),
            Err(err) => {
                let _ = statement.close();
                Err(err)
            }
        }
    }

    /// One observation per executed statement, slow or routine.
    fn observe(&self, bean: &str, sql: &str, params: &[Value], elapsed: Duration) {
        let cost = elapsed.as_millis();
        if self.is_slow(elapsed) {
            tracing::warn!("[{cost}ms] slow-sql: [{sql}] params: {params:?} on {bean}");
        } else {
            tracing::debug!("[{cost}ms] sql: [{sql}] params: {params:?} on {bean}");
        }
    }

    fn is_slow(&self, elapsed: Duration) -> bool {
        elapsed >= self.slow_sql_threshold
    }
}

fn discard(mut cursor: Box<dyn RowCursor>, mut statement: Box<dyn Statement>) {
    let _ = cursor.close();
    let _ = statement.close();
}
