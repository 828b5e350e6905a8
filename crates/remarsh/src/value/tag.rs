// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! Runtime type tags.
//!
//! A [`TypeTag`] describes the wire shape of a value. For most
//! operations the shape is implied by the operation signature; the
//! dynamic container is the one place a tag travels explicitly, so it
//! must be sufficient to losslessly reconstruct the value's shape,
//! alias identity included.

use crate::value::Value;
use std::fmt;

/// Runtime description of a value shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    WChar,
    Octet,
    Long,
    ULong,
    /// Narrow or wide character sequence.
    Text { wide: bool },
    /// Ordered sequence, optionally bounded.
    Sequence {
        elem: Box<TypeTag>,
        bound: Option<u32>,
    },
    /// Multi-dimensional fixed-size array; dims are part of the type.
    Array { elem: Box<TypeTag>, dims: Vec<usize> },
    /// Named struct with ordered fields.
    Struct {
        name: String,
        fields: Vec<(String, TypeTag)>,
    },
    /// Named discriminated union with a case table.
    Union {
        name: String,
        discriminant: Box<TypeTag>,
        cases: Vec<(String, TypeTag)>,
    },
    /// Type-def alias: structurally `inner`, wire-tagged as `name`.
    Alias { name: String, inner: Box<TypeTag> },
    /// Uninterpreted byte blob.
    Opaque,
    /// Nested dynamic container.
    Any,
}

impl TypeTag {
    /// Sequence tag.
    pub fn sequence(elem: TypeTag, bound: Option<u32>) -> Self {
        Self::Sequence {
            elem: Box::new(elem),
            bound,
        }
    }

    /// Fixed-array tag.
    pub fn array(elem: TypeTag, dims: Vec<usize>) -> Self {
        Self::Array {
            elem: Box::new(elem),
            dims,
        }
    }

    /// Struct tag.
    pub fn structure(name: impl Into<String>, fields: Vec<(String, TypeTag)>) -> Self {
        Self::Struct {
            name: name.into(),
            fields,
        }
    }

    /// Union tag with a full case table.
    pub fn union(
        name: impl Into<String>,
        discriminant: TypeTag,
        cases: Vec<(String, TypeTag)>,
    ) -> Self {
        Self::Union {
            name: name.into(),
            discriminant: Box::new(discriminant),
            cases,
        }
    }

    /// Alias tag.
    pub fn alias(name: impl Into<String>, inner: TypeTag) -> Self {
        Self::Alias {
            name: name.into(),
            inner: Box::new(inner),
        }
    }

    /// Strip alias layers down to the underlying shape.
    pub fn canonical(&self) -> &TypeTag {
        let mut tag = self;
        while let TypeTag::Alias { inner, .. } = tag {
            tag = inner;
        }
        tag
    }

    /// Structural compatibility, ignoring alias layers on both sides.
    ///
    /// Unions compare by type name, discriminant shape, and a
    /// case-subset relation: a tag derived from a live value only
    /// knows its active case, while a declared tag carries the full
    /// case table.
    pub fn is_compatible(&self, other: &TypeTag) -> bool {
        match (self.canonical(), other.canonical()) {
            (TypeTag::WChar, TypeTag::WChar)
            | (TypeTag::Octet, TypeTag::Octet)
            | (TypeTag::Long, TypeTag::Long)
            | (TypeTag::ULong, TypeTag::ULong)
            | (TypeTag::Opaque, TypeTag::Opaque)
            | (TypeTag::Any, TypeTag::Any) => true,
            (TypeTag::Text { wide: a }, TypeTag::Text { wide: b }) => a == b,
            (
                TypeTag::Sequence { elem: e1, bound: b1 },
                TypeTag::Sequence { elem: e2, bound: b2 },
            ) => b1 == b2 && e1.is_compatible(e2),
            (TypeTag::Array { elem: e1, dims: d1 }, TypeTag::Array { elem: e2, dims: d2 }) => {
                d1 == d2 && e1.is_compatible(e2)
            }
            (
                TypeTag::Struct { name: n1, fields: f1 },
                TypeTag::Struct { name: n2, fields: f2 },
            ) => {
                n1 == n2
                    && f1.len() == f2.len()
                    && f1
                        .iter()
                        .zip(f2)
                        .all(|((a_name, a_tag), (b_name, b_tag))| {
                            a_name == b_name && a_tag.is_compatible(b_tag)
                        })
            }
            (
                TypeTag::Union {
                    name: n1,
                    discriminant: dt1,
                    cases: c1,
                },
                TypeTag::Union {
                    name: n2,
                    discriminant: dt2,
                    cases: c2,
                },
            ) => {
                n1 == n2
                    && dt1.is_compatible(dt2)
                    && (cases_subset(c1, c2) || cases_subset(c2, c1))
            }
            _ => false,
        }
    }

    /// Check a declared tag against the actual shape of a value.
    ///
    /// Used at wrap time: the declared tag must structurally match the
    /// value. Alias layers on either side are transparent for the
    /// match; the declared tag (alias name included) becomes the
    /// container tag regardless.
    pub fn accepts(&self, value: &Value) -> bool {
        if let TypeTag::Alias { inner, .. } = self {
            // A declared alias accepts both the aliased value and its
            // plain underlying shape.
            return match value {
                Value::Alias { inner: vi, .. } => inner.accepts(vi),
                other => inner.accepts(other),
            };
        }
        if let Value::Alias { inner, .. } = value {
            return self.accepts(inner);
        }
        match (self, value) {
            (TypeTag::WChar, Value::WChar(_))
            | (TypeTag::Octet, Value::Octet(_))
            | (TypeTag::Long, Value::Long(_))
            | (TypeTag::ULong, Value::ULong(_))
            | (TypeTag::Opaque, Value::Opaque(_))
            | (TypeTag::Any, Value::Any(_)) => true,
            (TypeTag::Text { wide }, Value::Text { wide: vw, .. }) => wide == vw,
            (
                TypeTag::Sequence { elem, bound },
                Value::Sequence {
                    elem: ve,
                    bound: vb,
                    items,
                },
            ) => {
                bound == vb
                    && elem.is_compatible(ve)
                    && bound.map_or(true, |b| items.len() <= b as usize)
                    && items.iter().all(|item| elem.accepts(item))
            }
            (
                TypeTag::Array { elem, dims },
                Value::FixedArray {
                    elem: ve,
                    dims: vd,
                    items,
                },
            ) => {
                dims == vd
                    && elem.is_compatible(ve)
                    && items.iter().all(|item| elem.accepts(item))
            }
            (
                TypeTag::Struct { name, fields },
                Value::Struct {
                    name: vn,
                    fields: vf,
                },
            ) => {
                name == vn
                    && fields.len() == vf.len()
                    && fields
                        .iter()
                        .zip(vf)
                        .all(|((f_name, f_tag), (v_name, v))| f_name == v_name && f_tag.accepts(v))
            }
            (
                TypeTag::Union {
                    name,
                    discriminant,
                    cases,
                },
                Value::Union {
                    name: vn,
                    discriminant: vd,
                    case,
                    payload,
                },
            ) => {
                // The live case must exist in the declared table and
                // its payload must match that case's shape.
                name == vn
                    && discriminant.accepts(vd)
                    && cases
                        .iter()
                        .any(|(c_name, c_tag)| c_name == case && c_tag.accepts(payload))
            }
            _ => false,
        }
    }
}

fn cases_subset(sub: &[(String, TypeTag)], sup: &[(String, TypeTag)]) -> bool {
    sub.iter().all(|(name, tag)| {
        sup.iter()
            .any(|(s_name, s_tag)| s_name == name && s_tag.is_compatible(tag))
    })
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WChar => write!(f, "wchar"),
            Self::Octet => write!(f, "octet"),
            Self::Long => write!(f, "long"),
            Self::ULong => write!(f, "ulong"),
            Self::Text { wide: true } => write!(f, "wtext"),
            Self::Text { wide: false } => write!(f, "text"),
            Self::Sequence { elem, bound } => match bound {
                Some(b) => write!(f, "sequence<{}, {}>", elem, b),
                None => write!(f, "sequence<{}>", elem),
            },
            Self::Array { elem, dims } => {
                write!(f, "array<{}", elem)?;
                for d in dims {
                    write!(f, ", {}", d)?;
                }
                write!(f, ">")
            }
            Self::Struct { name, .. } => write!(f, "struct {}", name),
            Self::Union { name, .. } => write!(f, "union {}", name),
            Self::Alias { name, inner } => write!(f, "alias {}={}", name, inner),
            Self::Opaque => write!(f, "opaque"),
            Self::Any => write!(f, "any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_strips_nested_aliases() {
        let tag = TypeTag::alias("outer", TypeTag::alias("inner", TypeTag::Long));
        assert_eq!(tag.canonical(), &TypeTag::Long);
    }

    #[test]
    fn alias_is_transparent_for_compatibility() {
        let aliased = TypeTag::alias("long_alias", TypeTag::Long);
        assert!(aliased.is_compatible(&TypeTag::Long));
        assert!(TypeTag::Long.is_compatible(&aliased));
        assert!(!aliased.is_compatible(&TypeTag::ULong));
    }

    #[test]
    fn sequence_compatibility_requires_equal_bounds() {
        let bounded = TypeTag::sequence(TypeTag::Long, Some(10));
        let unbounded = TypeTag::sequence(TypeTag::Long, None);
        assert!(bounded.is_compatible(&bounded.clone()));
        assert!(!bounded.is_compatible(&unbounded));
    }

    #[test]
    fn union_partial_case_table_is_compatible_with_full() {
        let full = TypeTag::union(
            "Pick",
            TypeTag::Long,
            vec![
                ("first".to_string(), TypeTag::Long),
                ("second".to_string(), TypeTag::Octet),
            ],
        );
        let partial = TypeTag::union(
            "Pick",
            TypeTag::Long,
            vec![("second".to_string(), TypeTag::Octet)],
        );
        assert!(partial.is_compatible(&full));
        assert!(full.is_compatible(&partial));

        let foreign = TypeTag::union(
            "Pick",
            TypeTag::Long,
            vec![("third".to_string(), TypeTag::Octet)],
        );
        assert!(!foreign.is_compatible(&full));
    }

    #[test]
    fn struct_compatibility_is_name_and_field_order() {
        let a = TypeTag::structure(
            "Point",
            vec![
                ("x".to_string(), TypeTag::Long),
                ("y".to_string(), TypeTag::Long),
            ],
        );
        let swapped = TypeTag::structure(
            "Point",
            vec![
                ("y".to_string(), TypeTag::Long),
                ("x".to_string(), TypeTag::Long),
            ],
        );
        assert!(a.is_compatible(&a.clone()));
        assert!(!a.is_compatible(&swapped));
    }

    #[test]
    fn display_is_compact() {
        let tag = TypeTag::sequence(TypeTag::alias("long_alias", TypeTag::Long), Some(3));
        assert_eq!(tag.to_string(), "sequence<alias long_alias=long, 3>");
    }
}
