use std::sync::Arc;

/// Scalar leaf kinds a structured member can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Decimal,
    String,
}

/// Declared type shape of a field, resolved once at bean-registration time.
///
/// Shapes are explicit so that conversion never has to introspect runtime
/// types: a field declared as `list of list of pair(string,int)` carries
/// `Seq(Seq(Struct(pair)))` and the converter just walks it.
#[derive(Debug, Clone)]
pub enum TypeShape {
    Scalar(ScalarKind),
    Struct(Arc<StructShape>),
    Seq(Box<TypeShape>),
}

impl TypeShape {
    /// Declared sequence nesting depth (0 for a bare scalar or struct).
    #[must_use]
    pub fn seq_depth(&self) -> usize {
        match self {
            Self::Seq(inner) => 1 + inner.seq_depth(),
            _ => 0,
        }
    }

    /// Wraps `inner` in `depth` levels of sequence.
    #[must_use]
    pub fn seq_of(inner: Self, depth: usize) -> Self {
        let mut shape = inner;
        for _ in 0..depth {
            shape = Self::Seq(Box::new(shape));
        }
        shape
    }
}

/// Structured element type: name plus ordered members.
///
/// Member lookup during conversion is by name, case-sensitive.
#[derive(Debug, Clone)]
pub struct StructShape {
    pub name: String,
    pub members: Vec<StructMember>,
}

#[derive(Debug, Clone)]
pub struct StructMember {
    pub name: String,
    pub shape: TypeShape,
}

impl StructShape {
    #[must_use]
    pub fn new(name: impl Into<String>, members: Vec<(&str, TypeShape)>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            members: members
                .into_iter()
                .map(|(n, shape)| StructMember { name: n.to_string(), shape })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_depth() {
        let role = StructShape::new("Role", vec![
            ("id", TypeShape::Scalar(ScalarKind::Int)),
            ("name", TypeShape::Scalar(ScalarKind::String)),
        ]);
        assert_eq!(TypeShape::Struct(role.clone()).seq_depth(), 0);
        assert_eq!(TypeShape::seq_of(TypeShape::Struct(role.clone()), 1).seq_depth(), 1);
        assert_eq!(TypeShape::seq_of(TypeShape::Struct(role), 3).seq_depth(), 3);
    }
}
