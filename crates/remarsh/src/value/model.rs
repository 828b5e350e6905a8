// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! The tagged-value model.
//!
//! [`Value`] is the closed union over every shape the protocol can
//! carry. Values are constructed fresh per request from decoded wire
//! data and handed back by move; `Clone` is the deep-copy operation,
//! so an echoed result never aliases the caller's buffers.

use crate::codec::AnyValue;
use crate::error::{MarshalError, MarshalResult};
use crate::value::TypeTag;

/// A datum flowing across the protocol boundary.
#[derive(Debug, Clone)]
pub enum Value {
    // Scalars
    WChar(char),
    Octet(u8),
    Long(i32),
    ULong(u32),

    /// Narrow or wide character sequence. Zero-termination is a wire
    /// concern only and never embedded in the content.
    Text { wide: bool, content: String },

    /// Ordered sequence; `bound` is an invariant, not data. The
    /// element tag is carried so empty sequences stay self-describing.
    Sequence {
        elem: TypeTag,
        bound: Option<u32>,
        items: Vec<Value>,
    },

    /// Fixed-size array, row-major flattened over `dims`.
    FixedArray {
        elem: TypeTag,
        dims: Vec<usize>,
        items: Vec<Value>,
    },

    /// Named struct; insertion order is declared field order and all
    /// fields are always present.
    Struct {
        name: String,
        fields: Vec<(String, Value)>,
    },

    /// Discriminated union with exactly one live case. Discriminant,
    /// case name, and payload are only ever replaced together.
    Union {
        name: String,
        discriminant: Box<Value>,
        case: String,
        payload: Box<Value>,
    },

    /// Type-def alias: structurally `inner`, wire-tagged as `name`.
    Alias { name: String, inner: Box<Value> },

    /// Uninterpreted byte blob.
    Opaque(Vec<u8>),

    /// Nested dynamic container.
    Any(Box<AnyValue>),
}

impl Value {
    /// Build a sequence, enforcing the bound and element-shape
    /// invariants.
    pub fn sequence(elem: TypeTag, bound: Option<u32>, items: Vec<Value>) -> MarshalResult<Self> {
        if let Some(b) = bound {
            if items.len() > b as usize {
                return Err(MarshalError::InvalidShape(format!(
                    "sequence length {} exceeds bound {}",
                    items.len(),
                    b
                )));
            }
        }
        for (i, item) in items.iter().enumerate() {
            if !elem.accepts(item) {
                return Err(MarshalError::InvalidShape(format!(
                    "sequence element {} is {}, expected {}",
                    i,
                    item.tag_of(),
                    elem
                )));
            }
        }
        Ok(Self::Sequence { elem, bound, items })
    }

    /// Build a fixed array; dimension count and sizes are part of the
    /// static type and must match the flattened item count.
    pub fn fixed_array(elem: TypeTag, dims: Vec<usize>, items: Vec<Value>) -> MarshalResult<Self> {
        if dims.is_empty() || dims.contains(&0) {
            return Err(MarshalError::InvalidShape(
                "fixed array requires at least one non-zero dimension".to_string(),
            ));
        }
        let expected = dims
            .iter()
            .try_fold(1usize, |acc, d| acc.checked_mul(*d))
            .ok_or_else(|| {
                MarshalError::InvalidShape(format!(
                    "fixed array dims {:?} overflow the item count",
                    dims
                ))
            })?;
        if items.len() != expected {
            return Err(MarshalError::InvalidShape(format!(
                "fixed array dims {:?} require {} items, got {}",
                dims,
                expected,
                items.len()
            )));
        }
        for (i, item) in items.iter().enumerate() {
            if !elem.accepts(item) {
                return Err(MarshalError::InvalidShape(format!(
                    "array element {} is {}, expected {}",
                    i,
                    item.tag_of(),
                    elem
                )));
            }
        }
        Ok(Self::FixedArray { elem, dims, items })
    }

    /// Narrow text value.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            wide: false,
            content: content.into(),
        }
    }

    /// Wide text value.
    pub fn wide_text(content: impl Into<String>) -> Self {
        Self::Text {
            wide: true,
            content: content.into(),
        }
    }

    /// Struct value.
    pub fn structure(name: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        Self::Struct {
            name: name.into(),
            fields,
        }
    }

    /// Union value with the given live case.
    pub fn union(
        name: impl Into<String>,
        discriminant: Value,
        case: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self::Union {
            name: name.into(),
            discriminant: Box::new(discriminant),
            case: case.into(),
            payload: Box::new(payload),
        }
    }

    /// Alias value.
    pub fn alias(name: impl Into<String>, inner: Value) -> Self {
        Self::Alias {
            name: name.into(),
            inner: Box::new(inner),
        }
    }

    /// The wire tag describing this value's shape, alias identity
    /// preserved. A union value only knows its active case, so its tag
    /// carries a single-case table (see [`TypeTag::is_compatible`]).
    pub fn tag_of(&self) -> TypeTag {
        match self {
            Self::WChar(_) => TypeTag::WChar,
            Self::Octet(_) => TypeTag::Octet,
            Self::Long(_) => TypeTag::Long,
            Self::ULong(_) => TypeTag::ULong,
            Self::Text { wide, .. } => TypeTag::Text { wide: *wide },
            Self::Sequence { elem, bound, .. } => TypeTag::sequence(elem.clone(), *bound),
            Self::FixedArray { elem, dims, .. } => TypeTag::array(elem.clone(), dims.clone()),
            Self::Struct { name, fields } => TypeTag::structure(
                name.clone(),
                fields
                    .iter()
                    .map(|(f_name, v)| (f_name.clone(), v.tag_of()))
                    .collect(),
            ),
            Self::Union {
                name,
                discriminant,
                case,
                payload,
            } => TypeTag::union(
                name.clone(),
                discriminant.tag_of(),
                vec![(case.clone(), payload.tag_of())],
            ),
            Self::Alias { name, inner } => TypeTag::alias(name.clone(), inner.tag_of()),
            Self::Opaque(_) => TypeTag::Opaque,
            Self::Any(_) => TypeTag::Any,
        }
    }

    /// Strip alias layers down to the underlying value.
    pub fn unaliased(&self) -> &Value {
        let mut v = self;
        while let Value::Alias { inner, .. } = v {
            v = inner;
        }
        v
    }

    /// Try to get as wide char.
    pub fn as_wchar(&self) -> Option<char> {
        match self.unaliased() {
            Self::WChar(c) => Some(*c),
            _ => None,
        }
    }

    /// Try to get as octet.
    pub fn as_octet(&self) -> Option<u8> {
        match self.unaliased() {
            Self::Octet(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as signed 32-bit integer.
    pub fn as_long(&self) -> Option<i32> {
        match self.unaliased() {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as unsigned 32-bit integer.
    pub fn as_ulong(&self) -> Option<u32> {
        match self.unaliased() {
            Self::ULong(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get text content.
    pub fn as_text(&self) -> Option<&str> {
        match self.unaliased() {
            Self::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Try to get sequence items.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self.unaliased() {
            Self::Sequence { items, .. } | Self::FixedArray { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Short shape name for error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::WChar(_) => "wchar",
            Self::Octet(_) => "octet",
            Self::Long(_) => "long",
            Self::ULong(_) => "ulong",
            Self::Text { wide: true, .. } => "wtext",
            Self::Text { wide: false, .. } => "text",
            Self::Sequence { .. } => "sequence",
            Self::FixedArray { .. } => "array",
            Self::Struct { .. } => "struct",
            Self::Union { .. } => "union",
            Self::Alias { .. } => "alias",
            Self::Opaque(_) => "opaque",
            Self::Any(_) => "any",
        }
    }
}

/// Structural equality. Alias layers are transparent: an aliased
/// number equals the plain number. Alias identity is observable only
/// through the dynamic container, whose equality compares tags
/// exactly.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Alias { inner, .. }, rhs) => inner.as_ref() == rhs,
            (lhs, Value::Alias { inner, .. }) => lhs == inner.as_ref(),
            (Value::WChar(a), Value::WChar(b)) => a == b,
            (Value::Octet(a), Value::Octet(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::ULong(a), Value::ULong(b)) => a == b,
            (
                Value::Text { wide: w1, content: c1 },
                Value::Text { wide: w2, content: c2 },
            ) => w1 == w2 && c1 == c2,
            (
                Value::Sequence {
                    bound: b1,
                    items: i1,
                    ..
                },
                Value::Sequence {
                    bound: b2,
                    items: i2,
                    ..
                },
            ) => b1 == b2 && i1 == i2,
            (
                Value::FixedArray {
                    dims: d1, items: i1, ..
                },
                Value::FixedArray {
                    dims: d2, items: i2, ..
                },
            ) => d1 == d2 && i1 == i2,
            (
                Value::Struct { name: n1, fields: f1 },
                Value::Struct { name: n2, fields: f2 },
            ) => n1 == n2 && f1 == f2,
            (
                Value::Union {
                    name: n1,
                    discriminant: d1,
                    case: c1,
                    payload: p1,
                },
                Value::Union {
                    name: n2,
                    discriminant: d2,
                    case: c2,
                    payload: p2,
                },
            ) => n1 == n2 && c1 == c2 && d1 == d2 && p1 == p2,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            (Value::Any(a), Value::Any(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::WChar(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Self::Octet(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Long(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::ULong(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_seq(items: &[i32], bound: Option<u32>) -> Value {
        Value::sequence(
            TypeTag::Long,
            bound,
            items.iter().map(|&v| Value::Long(v)).collect(),
        )
        .expect("sequence within bound")
    }

    #[test]
    fn bounded_sequence_rejects_overflow() {
        let items: Vec<Value> = (0..11).map(Value::Long).collect();
        let err = Value::sequence(TypeTag::Long, Some(10), items).unwrap_err();
        assert_eq!(err.kind(), "InvalidShape");
    }

    #[test]
    fn bounded_sequence_accepts_exact_bound() {
        let items: Vec<Value> = (0..10).map(Value::Long).collect();
        assert!(Value::sequence(TypeTag::Long, Some(10), items).is_ok());
    }

    #[test]
    fn sequence_rejects_foreign_element_shape() {
        let err =
            Value::sequence(TypeTag::Long, None, vec![Value::Long(1), Value::Octet(2)]).unwrap_err();
        assert_eq!(err.kind(), "InvalidShape");
    }

    #[test]
    fn fixed_array_dims_must_match_item_count() {
        let items: Vec<Value> = (0..4).map(|v| Value::Octet(v as u8)).collect();
        assert!(Value::fixed_array(TypeTag::Octet, vec![2, 2], items.clone()).is_ok());
        let err = Value::fixed_array(TypeTag::Octet, vec![2, 3], items).unwrap_err();
        assert_eq!(err.kind(), "InvalidShape");
    }

    #[test]
    fn fixed_array_rejects_zero_dimension() {
        let err = Value::fixed_array(TypeTag::Octet, vec![2, 0], vec![]).unwrap_err();
        assert_eq!(err.kind(), "InvalidShape");
    }

    #[test]
    fn fixed_array_rejects_overflowing_dims() {
        // A corrupt decode can declare dims whose product does not fit
        // in usize; the constructor must fail, not wrap to 0 and
        // accept an empty item list.
        let err = Value::fixed_array(TypeTag::Octet, vec![usize::MAX, 2], vec![]).unwrap_err();
        assert_eq!(err.kind(), "InvalidShape");
    }

    #[test]
    fn alias_is_transparent_for_equality() {
        let plain = Value::Long(42);
        let aliased = Value::alias("long_alias", Value::Long(42));
        let doubly = Value::alias("outer", Value::alias("long_alias", Value::Long(42)));
        assert_eq!(aliased, plain);
        assert_eq!(plain, aliased);
        assert_eq!(doubly, plain);
        assert_ne!(aliased, Value::Long(43));
    }

    #[test]
    fn union_equality_covers_discriminant_case_and_payload() {
        let a = Value::union("Pick", Value::Long(0), "first", Value::Long(7));
        let b = Value::union("Pick", Value::Long(0), "first", Value::Long(7));
        let c = Value::union("Pick", Value::Long(1), "second", Value::Long(7));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn tag_of_preserves_alias_identity() {
        let aliased = Value::alias("long_alias", Value::Long(5));
        assert_eq!(
            aliased.tag_of(),
            TypeTag::alias("long_alias", TypeTag::Long)
        );
        assert_eq!(aliased.tag_of().canonical(), &TypeTag::Long);
    }

    #[test]
    fn clone_is_an_independent_deep_copy() {
        let original = long_seq(&[1, 2, 3], Some(10));
        let copy = original.clone();
        let mutated = match original {
            Value::Sequence { elem, bound, mut items } => {
                items[0] = Value::Long(99);
                Value::Sequence { elem, bound, items }
            }
            other => other,
        };
        assert_ne!(mutated, copy);
        assert_eq!(copy, long_seq(&[1, 2, 3], Some(10)));
    }

    #[test]
    fn numeric_accessors_see_through_aliases() {
        let aliased = Value::alias("long_alias", Value::Long(-13));
        assert_eq!(aliased.as_long(), Some(-13));
        assert_eq!(aliased.as_ulong(), None);
    }
}
