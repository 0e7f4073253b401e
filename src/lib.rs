// searchql - dynamic search/query runtime core
// Executes bean-described SQL pairs against named data sources and
// materializes typed, nested field values

// Clippy configuration - allow non-critical warnings
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::bool_assert_comparison)]

// Shared data model (values, type shapes, descriptors, errors)
pub mod core;

// Data sources and the driver seam
pub mod source;

// Query execution engine (list/cluster pair, transactions, result handle)
pub mod executor;

// Field conversion subsystem (converter registry, JSON converter)
pub mod convert;

// Row-to-bean materialization
pub mod materialize;

// Configuration surface
pub mod config;

// In-memory data source for tests
pub mod testing;

// Re-export commonly used types for convenience
pub use self::core::{
    BeanDescriptor, FieldDescriptor, FieldValue, ScalarKind, SearchError, SearchResult,
    StorageKind, StructShape, StructValue, TypeShape, Value,
};
pub use self::config::SearcherConfig;
pub use self::convert::{FieldConverter, FieldConverterRegistry, JsonFieldConverter};
pub use self::executor::{ExecutionResult, SearchQueryPackage, SqlExecutor};
pub use self::materialize::{BeanInstance, ResultMaterializer};
pub use self::source::{
    Connection, DataSource, DataSourceRegistry, IsolationLevel, RowCursor, Statement,
};
