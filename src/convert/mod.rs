/// Field conversion subsystem
///
/// Converters turn raw column values into a field's declared typed value.
/// The registry resolves, per (field descriptor, raw value) pair, the first
/// registered converter whose capability check accepts it; no match means
/// the raw value is used as-is.

pub mod json;

pub use json::JsonFieldConverter;

use std::sync::Arc;

use crate::core::{FieldDescriptor, FieldValue, SearchResult, Value};

pub trait FieldConverter: Send + Sync {
    /// Capability check over the field's declared type and the runtime type
    /// of the raw value. Must not inspect the value's content.
    fn supports(&self, field: &FieldDescriptor, raw: &Value) -> bool;

    /// Reconstructs the field's declared typed value from `raw`.
    /// All-or-nothing: a failure never yields a partial structure.
    fn convert(&self, field: &FieldDescriptor, raw: &Value) -> SearchResult<FieldValue>;
}

/// Ordered converter set. Registration order is significant: `resolve`
/// returns the first converter that supports the pair.
#[derive(Default)]
pub struct FieldConverterRegistry {
    converters: Vec<Arc<dyn FieldConverter>>,
}

impl FieldConverterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, converter: Arc<dyn FieldConverter>) {
        self.converters.push(converter);
    }

    #[must_use]
    pub fn resolve(&self, field: &FieldDescriptor, raw: &Value) -> Option<Arc<dyn FieldConverter>> {
        self.converters
            .iter()
            .find(|c| c.supports(field, raw))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ScalarKind, StorageKind, TypeShape};

    struct AcceptAll;

    impl FieldConverter for AcceptAll {
        fn supports(&self, _field: &FieldDescriptor, _raw: &Value) -> bool {
            true
        }
        fn convert(&self, _field: &FieldDescriptor, _raw: &Value) -> SearchResult<FieldValue> {
            Ok(FieldValue::Scalar(Value::Integer(1)))
        }
    }

    struct AcceptNone;

    impl FieldConverter for AcceptNone {
        fn supports(&self, _field: &FieldDescriptor, _raw: &Value) -> bool {
            false
        }
        fn convert(&self, _field: &FieldDescriptor, _raw: &Value) -> SearchResult<FieldValue> {
            Ok(FieldValue::Scalar(Value::Integer(2)))
        }
    }

    fn plain_field() -> FieldDescriptor {
        FieldDescriptor::new("age", "age", StorageKind::Plain,
            TypeShape::Scalar(ScalarKind::Int))
    }

    #[test]
    fn test_resolve_respects_registration_order() {
        let mut registry = FieldConverterRegistry::new();
        registry.register(Arc::new(AcceptNone));
        registry.register(Arc::new(AcceptAll));
        let field = plain_field();
        let converter = registry.resolve(&field, &Value::Integer(7)).unwrap();
        let converted = converter.convert(&field, &Value::Integer(7)).unwrap();
        assert_eq!(converted, FieldValue::Scalar(Value::Integer(1)));
    }

    #[test]
    fn test_resolve_none_when_no_match() {
        let mut registry = FieldConverterRegistry::new();
        registry.register(Arc::new(AcceptNone));
        assert!(registry.resolve(&plain_field(), &Value::Integer(7)).is_none());
    }
}
