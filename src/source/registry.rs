use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::core::{SearchError, SearchResult};

use super::DataSource;

/// Registry of the default and named data sources.
///
/// Populated at configuration time, read concurrently by request threads.
/// Late registrations are tolerated; reads only hold the lock long enough
/// to clone the `Arc`.
#[derive(Default)]
pub struct DataSourceRegistry {
    default: RwLock<Option<Arc<dyn DataSource>>>,
    named: RwLock<HashMap<String, Arc<dyn DataSource>>>,
}

impl DataSourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default data source.
    pub fn set_default(&self, source: Arc<dyn DataSource>) {
        *self.default.write().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(source);
    }

    /// Registers a named data source. Names are trimmed; a blank name is
    /// ignored.
    pub fn set_named(&self, name: &str, source: Arc<dyn DataSource>) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.named
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(name.to_string(), source);
    }

    /// Resolves a data source for `bean`.
    ///
    /// A blank or absent name resolves to the default source. A named lookup
    /// is exact: it never falls back to the default, even when one is
    /// configured.
    pub fn resolve(&self, name: Option<&str>, bean: &str) -> SearchResult<Arc<dyn DataSource>> {
        let name = name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return self
                .default
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
                .ok_or_else(|| SearchError::Connection(format!(
                    "There is no default data source for bean '{bean}'"
                )));
        }
        self.named
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| SearchError::Connection(format!(
                "There is no data source named '{name}' for bean '{bean}'"
            )))
    }
}
