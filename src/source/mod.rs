/// Data-source seam - abstraction over the SQL driver
///
/// The execution engine only ever talks to these traits. A driver binding
/// implements them over its own connection/statement handles; tests inject
/// the in-memory source from `crate::testing`.
///
/// All calls are blocking; one connection is owned by exactly one in-flight
/// request and never shared.

pub mod registry;

pub use registry::DataSourceRegistry;

use std::str::FromStr;

use crate::core::{SearchError, SearchResult, Value};

/// Transaction isolation level applied when transactional mode is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl FromStr for IsolationLevel {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read_uncommitted" | "read uncommitted" => Ok(Self::ReadUncommitted),
            "read_committed" | "read committed" => Ok(Self::ReadCommitted),
            "repeatable_read" | "repeatable read" => Ok(Self::RepeatableRead),
            "serializable" => Ok(Self::Serializable),
            other => Err(SearchError::Connection(format!(
                "Unknown isolation level '{other}'"
            ))),
        }
    }
}

/// Factory for connections, typically backed by a pool.
pub trait DataSource: Send + Sync {
    fn get_connection(&self) -> SearchResult<Box<dyn Connection>>;
}

impl std::fmt::Debug for dyn DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn DataSource")
    }
}

/// One exclusively-owned connection.
pub trait Connection: Send {
    fn prepare(&mut self, sql: &str) -> SearchResult<Box<dyn Statement>>;

    fn set_auto_commit(&mut self, auto_commit: bool) -> SearchResult<()>;

    fn set_transaction_isolation(&mut self, level: IsolationLevel) -> SearchResult<()>;

    fn set_read_only(&mut self, read_only: bool) -> SearchResult<()>;

    fn commit(&mut self) -> SearchResult<()>;

    /// Releases the connection (back to its pool). Must be idempotent.
    fn close(&mut self) -> SearchResult<()>;
}

/// One prepared statement with `?`-style positional placeholders.
pub trait Statement: Send {
    /// Binds a parameter. Positions are 1-based, in placeholder order.
    fn bind(&mut self, position: usize, value: Value) -> SearchResult<()>;

    fn execute_query(&mut self) -> SearchResult<Box<dyn RowCursor>>;

    /// Must be idempotent.
    fn close(&mut self) -> SearchResult<()>;
}

/// Forward-only cursor over query results.
pub trait RowCursor: Send {
    /// Advances to the next row; returns whether one is available.
    fn next(&mut self) -> SearchResult<bool>;

    /// Raw value of `column_label` in the current row.
    fn get(&mut self, column_label: &str) -> SearchResult<Value>;

    /// Must be idempotent.
    fn close(&mut self) -> SearchResult<()>;
}
