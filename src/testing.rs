//! In-memory data source for tests.
//!
//! Results are canned per SQL text. Failure injection (statement execution,
//! commit, cursor close) and open/close counters let tests assert the
//! executor's resource-lifecycle guarantees without a real driver.
//!
//! Snapshot semantics are modeled with a counter query: each live execution
//! serves the current counter value and then increments it, while a
//! connection in transactional mode serves the value frozen when auto-commit
//! was disabled. Two counter queries on one transactional connection thus
//! observe the same value; outside a transaction the second sees the bump
//! made by the first.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::{SearchError, SearchResult, Value};
use crate::source::{Connection, DataSource, IsolationLevel, RowCursor, Statement};

type Row = BTreeMap<String, Value>;

#[derive(Default)]
struct MemoryState {
    results: Mutex<HashMap<String, Vec<Row>>>,
    counter_queries: Mutex<HashSet<String>>,
    counter: AtomicI64,
    fail_execute: Mutex<HashSet<String>>,
    fail_cursor_close: Mutex<HashSet<String>>,
    fail_commit: AtomicBool,
    connections_opened: AtomicUsize,
    connections_closed: AtomicUsize,
}

/// In-memory `DataSource`. Clones share state, so a test can keep one clone
/// for assertions after handing another to the registry.
#[derive(Clone, Default)]
pub struct MemorySource {
    state: Arc<MemoryState>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cans the result rows served for `sql`.
    pub fn set_rows(&self, sql: &str, rows: Vec<Vec<(&str, Value)>>) {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(label, value)| (label.to_string(), value))
                    .collect()
            })
            .collect();
        self.state
            .results
            .lock()
            .unwrap()
            .insert(sql.to_string(), rows);
    }

    /// Marks `sql` as a counter query: it serves one row with a `cnt`
    /// column and bumps the live counter on every execution.
    pub fn register_counter_query(&self, sql: &str) {
        self.state
            .counter_queries
            .lock()
            .unwrap()
            .insert(sql.to_string());
    }

    pub fn set_counter(&self, value: i64) {
        self.state.counter.store(value, Ordering::SeqCst);
    }

    /// Makes executing `sql` fail.
    pub fn fail_execute(&self, sql: &str) {
        self.state
            .fail_execute
            .lock()
            .unwrap()
            .insert(sql.to_string());
    }

    /// Makes closing the cursor of `sql` fail.
    pub fn fail_cursor_close(&self, sql: &str) {
        self.state
            .fail_cursor_close
            .lock()
            .unwrap()
            .insert(sql.to_string());
    }

    /// Makes every commit fail.
    pub fn fail_commit(&self) {
        self.state.fail_commit.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn connections_opened(&self) -> usize {
        self.state.connections_opened.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn connections_closed(&self) -> usize {
        self.state.connections_closed.load(Ordering::SeqCst)
    }
}

impl DataSource for MemorySource {
    fn get_connection(&self) -> SearchResult<Box<dyn Connection>> {
        self.state.connections_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            state: self.state.clone(),
            snapshot_counter: None,
            closed: false,
        }))
    }
}

struct MemoryConnection {
    state: Arc<MemoryState>,
    /// Counter value frozen at transaction begin; `None` outside one.
    snapshot_counter: Option<i64>,
    closed: bool,
}

impl Connection for MemoryConnection {
    fn prepare(&mut self, sql: &str) -> SearchResult<Box<dyn Statement>> {
        if self.closed {
            return Err(SearchError::Execution(
                "Connection already closed".to_string(),
            ));
        }
        Ok(Box::new(MemoryStatement {
            state: self.state.clone(),
            sql: sql.to_string(),
            params: Vec::new(),
            snapshot_counter: self.snapshot_counter,
        }))
    }

    fn set_auto_commit(&mut self, auto_commit: bool) -> SearchResult<()> {
        self.snapshot_counter = if auto_commit {
            None
        } else {
            Some(self.state.counter.load(Ordering::SeqCst))
        };
        Ok(())
    }

    fn set_transaction_isolation(&mut self, _level: IsolationLevel) -> SearchResult<()> {
        Ok(())
    }

    fn set_read_only(&mut self, _read_only: bool) -> SearchResult<()> {
        Ok(())
    }

    fn commit(&mut self) -> SearchResult<()> {
        if self.state.fail_commit.load(Ordering::SeqCst) {
            return Err(SearchError::Execution("Commit failed".to_string()));
        }
        self.snapshot_counter = None;
        Ok(())
    }

    fn close(&mut self) -> SearchResult<()> {
        if !self.closed {
            self.closed = true;
            self.state.connections_closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

struct MemoryStatement {
    state: Arc<MemoryState>,
    sql: String,
    params: Vec<(usize, Value)>,
    snapshot_counter: Option<i64>,
}

impl Statement for MemoryStatement {
    fn bind(&mut self, position: usize, value: Value) -> SearchResult<()> {
        if position == 0 {
            return Err(SearchError::Execution(
                "Parameter positions are 1-based".to_string(),
            ));
        }
        self.params.push((position, value));
        Ok(())
    }

    fn execute_query(&mut self) -> SearchResult<Box<dyn RowCursor>> {
        if self.state.fail_execute.lock().unwrap().contains(&self.sql) {
            return Err(SearchError::Execution(format!(
                "Execution failed for [{}]",
                self.sql
            )));
        }
        let rows = if self.state.counter_queries.lock().unwrap().contains(&self.sql) {
            let live = self.state.counter.fetch_add(1, Ordering::SeqCst);
            let seen = self.snapshot_counter.unwrap_or(live);
            let mut row = Row::new();
            row.insert("cnt".to_string(), Value::Integer(seen));
            vec![row]
        } else {
            self.state
                .results
                .lock()
                .unwrap()
                .get(&self.sql)
                .cloned()
                .unwrap_or_default()
        };
        let fail_close = self
            .state
            .fail_cursor_close
            .lock()
            .unwrap()
            .contains(&self.sql);
        Ok(Box::new(MemoryCursor {
            rows,
            position: 0,
            fail_close,
        }))
    }

    fn close(&mut self) -> SearchResult<()> {
        Ok(())
    }
}

struct MemoryCursor {
    rows: Vec<Row>,
    /// 0 means before the first row.
    position: usize,
    fail_close: bool,
}

impl RowCursor for MemoryCursor {
    fn next(&mut self) -> SearchResult<bool> {
        if self.position < self.rows.len() {
            self.position += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn get(&mut self, column_label: &str) -> SearchResult<Value> {
        let row = self
            .position
            .checked_sub(1)
            .and_then(|idx| self.rows.get(idx))
            .ok_or_else(|| SearchError::Execution("No current row".to_string()))?;
        row.get(column_label).cloned().ok_or_else(|| {
            SearchError::Execution(format!("Column '{column_label}' not found"))
        })
    }

    fn close(&mut self) -> SearchResult<()> {
        if self.fail_close {
            return Err(SearchError::Execution(
                "Cursor close failed".to_string(),
            ));
        }
        Ok(())
    }
}
