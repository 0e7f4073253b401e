use super::shape::TypeShape;

/// How a field's value is stored in its source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Plain column value, used as-is.
    Plain,
    /// Serialized container: the column holds a JSON payload that encodes
    /// the field's declared (possibly nested) structure.
    Json,
}

/// Resolved metadata for one mapped field.
///
/// Built once by the metadata resolver and shared read-only by every request
/// for the owning bean type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Logical field name.
    pub name: String,
    /// Source column label in query results.
    pub column: String,
    pub storage: StorageKind,
    pub shape: TypeShape,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, column: impl Into<String>,
               storage: StorageKind, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            storage,
            shape,
        }
    }
}
