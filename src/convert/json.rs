use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::core::{
    FieldDescriptor, FieldValue, ScalarKind, SearchError, SearchResult, StorageKind, StructValue,
    TypeShape, Value,
};

use super::FieldConverter;

/// Converter for serialized-container fields: reconstructs the field's full
/// declared shape, however deeply nested, from a JSON text payload.
///
/// The payload is parsed into an untyped tree first, then coerced level by
/// level against the declared `TypeShape`. Coercion is all-or-nothing: a
/// shape mismatch or an uncoercible leaf fails the whole field value.
pub struct JsonFieldConverter;

impl FieldConverter for JsonFieldConverter {
    fn supports(&self, field: &FieldDescriptor, raw: &Value) -> bool {
        // declared-type check only, independent of nesting depth
        field.storage == StorageKind::Json && matches!(raw, Value::Text(_) | Value::Json(_))
    }

    fn convert(&self, field: &FieldDescriptor, raw: &Value) -> SearchResult<FieldValue> {
        let payload = raw.as_text().ok_or_else(|| {
            SearchError::Conversion(format!(
                "Field '{}' expects a serialized payload, got {raw:?}",
                field.name
            ))
        })?;
        let tree: JsonValue = serde_json::from_str(payload).map_err(|err| {
            SearchError::Conversion(format!("Field '{}': invalid JSON: {err}", field.name))
        })?;
        coerce(&field.shape, &tree, &field.name)
    }
}

fn coerce(shape: &TypeShape, node: &JsonValue, field: &str) -> SearchResult<FieldValue> {
    match shape {
        TypeShape::Seq(inner) => match node {
            JsonValue::Array(items) => items
                .iter()
                .map(|item| coerce(inner, item, field))
                .collect::<SearchResult<Vec<_>>>()
                .map(FieldValue::Seq),
            other => Err(SearchError::Conversion(format!(
                "Field '{field}': expected a JSON array, got {other}"
            ))),
        },
        TypeShape::Struct(def) => match node {
            JsonValue::Object(map) => {
                let mut members = Vec::with_capacity(def.members.len());
                for member in &def.members {
                    let child = map.get(&member.name).ok_or_else(|| {
                        SearchError::Conversion(format!(
                            "Field '{field}': missing member '{}' of {}",
                            member.name, def.name
                        ))
                    })?;
                    members.push((member.name.clone(), coerce(&member.shape, child, field)?));
                }
                Ok(FieldValue::Struct(StructValue {
                    type_name: def.name.clone(),
                    members,
                }))
            }
            other => Err(SearchError::Conversion(format!(
                "Field '{field}': expected a JSON object for {}, got {other}",
                def.name
            ))),
        },
        TypeShape::Scalar(kind) => coerce_scalar(*kind, node, field),
    }
}

fn coerce_scalar(kind: ScalarKind, node: &JsonValue, field: &str) -> SearchResult<FieldValue> {
    if node.is_null() {
        return Ok(FieldValue::Scalar(Value::Null));
    }
    let coerced = match kind {
        ScalarKind::Bool => node.as_bool().map(Value::Boolean),
        ScalarKind::Int => node
            .as_i64()
            .or_else(|| node.as_str().and_then(|s| s.parse().ok()))
            .map(Value::Integer),
        ScalarKind::Float => node
            .as_f64()
            .or_else(|| node.as_str().and_then(|s| s.parse().ok()))
            .map(Value::Real),
        ScalarKind::Decimal => match node {
            JsonValue::Number(n) => n.to_string().parse::<Decimal>().ok().map(Value::Numeric),
            JsonValue::String(s) => s.parse::<Decimal>().ok().map(Value::Numeric),
            _ => None,
        },
        ScalarKind::String => node.as_str().map(|s| Value::Text(s.to_string())),
    };
    coerced.map(FieldValue::Scalar).ok_or_else(|| {
        SearchError::Conversion(format!(
            "Field '{field}': can not coerce {node} into {kind:?}"
        ))
    })
}
