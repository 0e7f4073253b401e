use std::sync::Arc;

use crate::convert::FieldConverterRegistry;
use crate::core::{BeanDescriptor, FieldDescriptor, FieldValue, SearchResult, Value};
use crate::executor::ExecutionResult;

/// One materialized bean instance: typed values in field-declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct BeanInstance {
    pub bean: String,
    pub values: Vec<(String, FieldValue)>,
}

impl BeanInstance {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }
}

/// Turns raw cursor rows into typed bean instances through the converter
/// registry.
pub struct ResultMaterializer {
    converters: Arc<FieldConverterRegistry>,
}

impl ResultMaterializer {
    #[must_use]
    pub fn new(converters: Arc<FieldConverterRegistry>) -> Self {
        Self { converters }
    }

    /// Converts one raw column value for `field`.
    ///
    /// An absent raw value never reaches a converter: it materializes as a
    /// null scalar directly. When no converter supports the pair, the raw
    /// value is used as-is.
    pub fn convert_value(&self, field: &FieldDescriptor, raw: Value) -> SearchResult<FieldValue> {
        if raw.is_null() {
            return Ok(FieldValue::Scalar(Value::Null));
        }
        match self.converters.resolve(field, &raw) {
            Some(converter) => converter.convert(field, &raw),
            None => Ok(FieldValue::Scalar(raw)),
        }
    }

    /// Advances the list cursor and materializes the next row, or `None`
    /// when the cursor is exhausted.
    pub fn next_instance(
        &self,
        bean: &BeanDescriptor,
        result: &mut ExecutionResult,
    ) -> SearchResult<Option<BeanInstance>> {
        if !result.next()? {
            return Ok(None);
        }
        let mut values = Vec::with_capacity(bean.fields.len());
        for field in &bean.fields {
            let raw = result.get(&field.column)?;
            values.push((field.name.clone(), self.convert_value(field, raw)?));
        }
        Ok(Some(BeanInstance {
            bean: bean.name.clone(),
            values,
        }))
    }

    /// Materializes one column of the cluster row. A cluster query without
    /// a row yields a null scalar.
    pub fn cluster_value(
        &self,
        field: &FieldDescriptor,
        result: &mut ExecutionResult,
    ) -> SearchResult<FieldValue> {
        let raw = result.cluster_get(&field.column)?;
        self.convert_value(field, raw)
    }
}
