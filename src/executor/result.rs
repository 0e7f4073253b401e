use crate::core::{SearchError, SearchResult, Value};
use crate::source::{Connection, RowCursor, Statement};

/// Open list-query handle: forward-only cursor plus its statement.
pub(crate) struct ListHandle {
    pub(crate) statement: Box<dyn Statement>,
    pub(crate) cursor: Box<dyn RowCursor>,
}

/// Open cluster-query handle. The cursor was advanced once at execution
/// time; `has_row` remembers whether the single logical row exists.
pub(crate) struct ClusterHandle {
    pub(crate) statement: Box<dyn Statement>,
    pub(crate) cursor: Box<dyn RowCursor>,
    pub(crate) has_row: bool,
}

/// Combined result of one executed search: at most one open list cursor, at
/// most one cluster row, and the one connection that owns them.
///
/// Closing releases everything exactly once, in a fixed order, best-effort:
/// a failure closing one resource never prevents attempting the rest.
pub struct ExecutionResult {
    list: Option<ListHandle>,
    cluster: Option<ClusterHandle>,
    connection: Option<Box<dyn Connection>>,
    closed: bool,
}

impl ExecutionResult {
    /// Already-closed result for a request with neither query flag set.
    #[must_use]
    pub(crate) fn empty() -> Self {
        Self {
            list: None,
            cluster: None,
            connection: None,
            closed: true,
        }
    }

    pub(crate) fn open(
        connection: Box<dyn Connection>,
        list: Option<ListHandle>,
        cluster: Option<ClusterHandle>,
    ) -> Self {
        Self {
            list,
            cluster,
            connection: Some(connection),
            closed: false,
        }
    }

    /// Advances the list cursor. Returns `false` when no row is available
    /// or no list query was executed.
    pub fn next(&mut self) -> SearchResult<bool> {
        match self.list.as_mut() {
            Some(list) => list.cursor.next(),
            None => Ok(false),
        }
    }

    /// Raw value of `column_label` in the current list row.
    pub fn get(&mut self, column_label: &str) -> SearchResult<Value> {
        match self.list.as_mut() {
            Some(list) => list.cursor.get(column_label),
            None => Err(SearchError::Execution(
                "No list query was executed".to_string(),
            )),
        }
    }

    /// Raw value of `column_label` in the cluster row.
    ///
    /// A cluster query that yielded no row is a valid outcome: every column
    /// reads as `Value::Null`, never an error. Same when no cluster query
    /// was executed.
    pub fn cluster_get(&mut self, column_label: &str) -> SearchResult<Value> {
        match self.cluster.as_mut() {
            Some(cluster) if cluster.has_row => cluster.cursor.get(column_label),
            _ => Ok(Value::Null),
        }
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes, in order: list cursor, list statement, cluster cursor,
    /// cluster statement, connection. Idempotent. Every resource is
    /// attempted even if an earlier close fails; the first failure is
    /// reported once all attempts complete.
    pub fn close(&mut self) -> SearchResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let mut first_error: Option<SearchError> = None;
        let mut attempt = |outcome: SearchResult<()>| {
            if let Err(err) = outcome {
                if first_error.is_none() {
                    first_error = Some(SearchError::Cleanup(err.to_string()));
                }
            }
        };
        if let Some(mut list) = self.list.take() {
            attempt(list.cursor.close());
            attempt(list.statement.close());
        }
        if let Some(mut cluster) = self.cluster.take() {
            attempt(cluster.cursor.close());
            attempt(cluster.statement.close());
        }
        if let Some(mut connection) = self.connection.take() {
            attempt(connection.close());
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for ExecutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionResult")
            .field("has_list", &self.list.is_some())
            .field("has_cluster", &self.cluster.is_some())
            .field("has_connection", &self.connection.is_some())
            .field("closed", &self.closed)
            .finish()
    }
}

impl Drop for ExecutionResult {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
