// Module declarations
pub mod error;
pub mod value;
pub mod shape;
pub mod field;
pub mod bean;

// Re-exports for convenience
pub use error::{SearchError, SearchResult};
pub use value::{FieldValue, StructValue, Value};
pub use shape::{ScalarKind, StructMember, StructShape, TypeShape};
pub use field::{FieldDescriptor, StorageKind};
pub use bean::BeanDescriptor;
