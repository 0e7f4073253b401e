use std::sync::Arc;

use crate::core::{BeanDescriptor, Value};

/// Resolved per-request query pair, produced by the query builder.
///
/// Immutable once built: the executor only reads it. Parameter order must
/// match the `?` placeholders of the corresponding SQL text.
#[derive(Debug, Clone)]
pub struct SearchQueryPackage {
    pub bean: Arc<BeanDescriptor>,
    pub needs_list_query: bool,
    pub needs_cluster_query: bool,
    pub list_sql: String,
    pub list_params: Vec<Value>,
    pub cluster_sql: String,
    pub cluster_params: Vec<Value>,
}

impl SearchQueryPackage {
    /// A package requesting no queries at all.
    #[must_use]
    pub fn new(bean: Arc<BeanDescriptor>) -> Self {
        Self {
            bean,
            needs_list_query: false,
            needs_cluster_query: false,
            list_sql: String::new(),
            list_params: Vec::new(),
            cluster_sql: String::new(),
            cluster_params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_list_query(mut self, sql: impl Into<String>, params: Vec<Value>) -> Self {
        self.needs_list_query = true;
        self.list_sql = sql.into();
        self.list_params = params;
        self
    }

    #[must_use]
    pub fn with_cluster_query(mut self, sql: impl Into<String>, params: Vec<Value>) -> Self {
        self.needs_cluster_query = true;
        self.cluster_sql = sql.into();
        self.cluster_params = params;
        self
    }
}
