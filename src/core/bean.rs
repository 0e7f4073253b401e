use super::error::{SearchError, SearchResult};
use super::field::FieldDescriptor;

/// Resolved metadata for one mapped bean type.
#[derive(Debug, Clone)]
pub struct BeanDescriptor {
    /// Bean identity, used in diagnostics.
    pub name: String,
    /// Logical data-source name; `None` means the default source.
    pub data_source: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

impl BeanDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            data_source: None,
            fields,
        }
    }

    #[must_use]
    pub fn with_data_source(mut self, name: impl Into<String>) -> Self {
        self.data_source = Some(name.into());
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn require_field(&self, name: &str) -> SearchResult<&FieldDescriptor> {
        self.field(name)
            .ok_or_else(|| SearchError::FieldNotFound(name.to_string()))
    }
}
