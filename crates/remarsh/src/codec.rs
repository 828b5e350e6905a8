// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! Dynamic-container codec.
//!
//! [`AnyValue`] pairs an explicit type tag with a payload value: the
//! one place where the wire carries the shape itself rather than
//! implying it through the operation signature. [`wrap`] verifies the
//! declared tag against the payload's actual shape; [`extract`]
//! verifies the tag against the receiver's expected shape and hands
//! back a deep copy coerced to that shape's representation.

use crate::error::{MarshalError, MarshalResult};
use crate::value::{TypeTag, Value};

/// A value whose shape travels explicitly with it.
///
/// Equality compares the tag exactly, alias identity included; the
/// payload compares structurally. This is what makes alias identity
/// observable through re-wrapping while staying invisible to plain
/// value equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyValue {
    pub tag: TypeTag,
    pub value: Value,
}

impl AnyValue {
    /// Wrap a value under its own intrinsic tag (alias-preserving).
    pub fn from_value(value: Value) -> Self {
        Self {
            tag: value.tag_of(),
            value,
        }
    }
}

/// Wrap `value` into a dynamic container tagged `declared`.
///
/// Fails with `TypeTagMismatch` when the declared tag does not
/// structurally match the value. Wrapping an alias value keeps the
/// alias name as the container tag rather than the underlying type's
/// canonical name.
pub fn wrap(value: Value, declared: TypeTag) -> MarshalResult<AnyValue> {
    if !declared.accepts(&value) {
        return Err(MarshalError::TypeTagMismatch {
            declared: declared.to_string(),
            actual: value.tag_of().to_string(),
        });
    }
    Ok(AnyValue {
        tag: declared,
        value,
    })
}

/// Extract a value of shape `expected` from a dynamic container.
///
/// Fails with `TypeMismatch` when the container tag is not
/// structurally compatible with `expected`. On success the payload is
/// deep-copied and coerced to `expected`'s representation: alias
/// layers are stripped or re-introduced so that, for example, a value
/// tagged with an alias of `long` extracts into a plain `long` with
/// the bit-identical number.
pub fn extract(container: &AnyValue, expected: &TypeTag) -> MarshalResult<Value> {
    if !container.tag.is_compatible(expected) {
        return Err(MarshalError::TypeMismatch {
            expected: expected.to_string(),
            found: container.tag.to_string(),
        });
    }
    coerce(&container.value, expected)
}

/// Reshape a value to the expected tag's representation.
///
/// Compatibility has already been established tag-to-tag; this walk
/// re-checks data-dependent invariants (sequence bounds, array dims)
/// since a corrupted container is a data error, not a valid state.
fn coerce(value: &Value, expected: &TypeTag) -> MarshalResult<Value> {
    if let TypeTag::Alias { name, inner } = expected {
        let plain = coerce(value.unaliased(), inner)?;
        return Ok(Value::alias(name.clone(), plain));
    }
    if let Value::Alias { inner, .. } = value {
        return coerce(inner, expected);
    }
    match (expected, value) {
        (TypeTag::WChar, Value::WChar(_))
        | (TypeTag::Octet, Value::Octet(_))
        | (TypeTag::Long, Value::Long(_))
        | (TypeTag::ULong, Value::ULong(_))
        | (TypeTag::Text { .. }, Value::Text { .. })
        | (TypeTag::Opaque, Value::Opaque(_))
        | (TypeTag::Any, Value::Any(_)) => Ok(value.clone()),
        (TypeTag::Sequence { elem, bound }, Value::Sequence { items, .. }) => {
            if let Some(b) = bound {
                if items.len() > *b as usize {
                    return Err(MarshalError::InvalidShape(format!(
                        "decoded sequence length {} exceeds bound {}",
                        items.len(),
                        b
                    )));
                }
            }
            let coerced: MarshalResult<Vec<Value>> =
                items.iter().map(|item| coerce(item, elem)).collect();
            Ok(Value::Sequence {
                elem: (**elem).clone(),
                bound: *bound,
                items: coerced?,
            })
        }
        (TypeTag::Array { elem, dims }, Value::FixedArray { items, dims: vd, .. }) => {
            if dims != vd {
                return Err(MarshalError::InvalidShape(format!(
                    "decoded array dims {:?} do not match declared {:?}",
                    vd, dims
                )));
            }
            let coerced: MarshalResult<Vec<Value>> =
                items.iter().map(|item| coerce(item, elem)).collect();
            Ok(Value::FixedArray {
                elem: (**elem).clone(),
                dims: dims.clone(),
                items: coerced?,
            })
        }
        (TypeTag::Struct { name, fields }, Value::Struct { fields: vf, .. }) => {
            let mut out = Vec::with_capacity(fields.len());
            for ((f_name, f_tag), (v_name, v)) in fields.iter().zip(vf) {
                if f_name != v_name {
                    return Err(MarshalError::TypeMismatch {
                        expected: format!("field {}", f_name),
                        found: format!("field {}", v_name),
                    });
                }
                out.push((f_name.clone(), coerce(v, f_tag)?));
            }
            Ok(Value::structure(name.clone(), out))
        }
        (
            TypeTag::Union {
                name,
                discriminant,
                cases,
            },
            Value::Union {
                discriminant: vd,
                case,
                payload,
                ..
            },
        ) => {
            let (_, case_tag) = cases
                .iter()
                .find(|(c_name, _)| c_name == case)
                .ok_or_else(|| MarshalError::TypeMismatch {
                    expected: format!("a case of union {}", name),
                    found: format!("case {}", case),
                })?;
            Ok(Value::union(
                name.clone(),
                coerce(vd, discriminant)?,
                case.clone(),
                coerce(payload, case_tag)?,
            ))
        }
        (tag, value) => Err(MarshalError::TypeMismatch {
            expected: tag.to_string(),
            found: value.shape_name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_rejects_mismatched_tag() {
        let err = wrap(Value::Long(5), TypeTag::ULong).unwrap_err();
        assert_eq!(err.kind(), "TypeTagMismatch");
    }

    #[test]
    fn round_trip_returns_equal_value() {
        let v = Value::sequence(
            TypeTag::Long,
            Some(10),
            vec![Value::Long(1), Value::Long(2), Value::Long(3)],
        )
        .expect("within bound");
        let tag = v.tag_of();
        let container = wrap(v.clone(), tag.clone()).expect("wrap");
        let out = extract(&container, &tag).expect("extract");
        assert_eq!(out, v);
    }

    #[test]
    fn alias_tag_survives_wrap_and_rewrap() {
        let aliased = Value::alias("long_alias", Value::Long(21));
        let container = wrap(aliased.clone(), aliased.tag_of()).expect("wrap");
        assert_eq!(container.tag, TypeTag::alias("long_alias", TypeTag::Long));

        // Extract into the aliased shape, then wrap again: alias kept.
        let expected = TypeTag::alias("long_alias", TypeTag::Long);
        let out = extract(&container, &expected).expect("extract");
        let rewrapped = AnyValue::from_value(out);
        assert_eq!(rewrapped.tag, container.tag);
    }

    #[test]
    fn alias_is_transparent_for_plain_extraction() {
        let aliased = Value::alias("long_alias", Value::Long(-13));
        let container = wrap(aliased.clone(), aliased.tag_of()).expect("wrap");
        let out = extract(&container, &TypeTag::Long).expect("extract");
        assert_eq!(out, Value::Long(-13));
        // Bit-exact: sign preserved across the alias boundary.
        assert_eq!(out.as_long(), Some(-13));
    }

    #[test]
    fn extraction_into_alias_reintroduces_the_alias_layer() {
        let container = wrap(Value::Long(9), TypeTag::Long).expect("wrap");
        let expected = TypeTag::alias("long_alias", TypeTag::Long);
        let out = extract(&container, &expected).expect("extract");
        assert_eq!(out.tag_of(), expected);
        assert_eq!(out, Value::Long(9));
    }

    #[test]
    fn extract_rejects_incompatible_shape() {
        let container = wrap(Value::ULong(13), TypeTag::ULong).expect("wrap");
        let err = extract(&container, &TypeTag::Long).unwrap_err();
        assert_eq!(err.kind(), "TypeMismatch");
    }

    #[test]
    fn container_equality_sees_alias_identity() {
        let plain = AnyValue::from_value(Value::Long(3));
        let aliased = AnyValue::from_value(Value::alias("long_alias", Value::Long(3)));
        // Plain value equality is alias-transparent...
        assert_eq!(plain.value, aliased.value);
        // ...container equality is not.
        assert_ne!(plain, aliased);
    }

    #[test]
    fn nested_container_round_trip() {
        let inner = AnyValue::from_value(Value::ULong(4));
        let outer_value = Value::Any(Box::new(inner));
        let container = wrap(outer_value.clone(), TypeTag::Any).expect("wrap");
        let out = extract(&container, &TypeTag::Any).expect("extract");
        assert_eq!(out, outer_value);
    }
}
