// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! The echo operation set.
//!
//! One identity operation per value shape, plus explicit dynamic
//! wrap/extract operations and a single piece of server state: the
//! stored sequence. Every result is an owned deep copy; nothing
//! returned here aliases a caller buffer.

use crate::codec::{extract, wrap, AnyValue};
use crate::error::{MarshalError, MarshalResult};
use crate::runtime::{ObjectRef, ObjectRegistry};
use crate::service::dispatch::take_arg;
use crate::service::{ChildService, Servant};
use crate::value::{TypeTag, Value};
use parking_lot::Mutex;
use std::sync::Arc;

/// Alias name used by the typed-long round-trip operations.
pub const LONG_ALIAS: &str = "long_alias";

/// Alias name of the bounded long-sequence typedef.
pub const BOUNDED_LONG_SEQ_ALIAS: &str = "bounded_long_seq";

/// Bound of the long-sequence typedef (and of the stored sequence in
/// the original interface).
pub const LONG_SEQ_BOUND: u32 = 10;

/// Bound of one row in the octet-matrix operations.
pub const OCTET_BLOCK_BOUND: u32 = 16;

/// Root servant of the conformance harness.
pub struct EchoService {
    /// The one piece of shared state: replaced wholesale on every
    /// store, so readers never observe a partial write.
    stored: Mutex<Option<Value>>,
    registry: Arc<ObjectRegistry>,
}

impl EchoService {
    pub fn new(registry: Arc<ObjectRegistry>) -> Self {
        Self {
            stored: Mutex::new(None),
            registry,
        }
    }

    // Scalar identity.

    pub fn echo_wchar(&self, v: char) -> char {
        v
    }

    pub fn echo_octet(&self, v: u8) -> u8 {
        v
    }

    pub fn echo_long(&self, v: i32) -> i32 {
        v
    }

    pub fn echo_ulong(&self, v: u32) -> u32 {
        v
    }

    /// Narrow or wide text identity.
    pub fn echo_text(&self, v: Value) -> MarshalResult<Value> {
        match v {
            Value::Text { .. } => Ok(v),
            other => Err(shape_error("text", &other)),
        }
    }

    /// Union identity.
    pub fn echo_union(&self, v: Value) -> MarshalResult<Value> {
        match v {
            Value::Union { .. } => Ok(v),
            other => Err(shape_error("union", &other)),
        }
    }

    /// Identity for unions discriminated by an enum-style ordinal.
    pub fn echo_union_e(&self, v: Value) -> MarshalResult<Value> {
        match &v {
            Value::Union { discriminant, .. }
                if matches!(discriminant.as_ref(), Value::ULong(_)) =>
            {
                Ok(v)
            }
            other => Err(shape_error("union with ordinal discriminant", other)),
        }
    }

    /// Build and wrap a union type the caller has no static knowledge
    /// of; decoding it exercises the receiver's tag-driven path.
    pub fn wrap_unknown_union(&self) -> MarshalResult<AnyValue> {
        let value = Value::union("ExtendedStatus", Value::ULong(0), "code", Value::Long(13));
        let declared = TypeTag::union(
            "ExtendedStatus",
            TypeTag::ULong,
            vec![("code".to_string(), TypeTag::Long)],
        );
        wrap(value, declared)
    }

    /// Dynamic-container identity.
    pub fn echo_any(&self, v: AnyValue) -> AnyValue {
        v
    }

    /// Explicit codec wrap with a caller-declared tag.
    pub fn wrap_as_dynamic(&self, value: Value, tag: TypeTag) -> MarshalResult<AnyValue> {
        wrap(value, tag)
    }

    /// Explicit codec extract against a caller-expected shape.
    pub fn extract_from_dynamic(
        &self,
        container: &AnyValue,
        expected: &TypeTag,
    ) -> MarshalResult<Value> {
        extract(container, expected)
    }

    /// Sequence identity; a declared bound is re-checked on the way
    /// through.
    pub fn echo_sequence(&self, v: Value) -> MarshalResult<Value> {
        match v {
            Value::Sequence { elem, bound, items } => Value::sequence(elem, bound, items),
            other => Err(shape_error("sequence", &other)),
        }
    }

    /// Like [`Self::echo_sequence`] but the shape must carry a bound.
    pub fn echo_bounded_sequence(&self, v: Value) -> MarshalResult<Value> {
        match &v {
            Value::Sequence { bound: Some(_), .. } => self.echo_sequence(v),
            other => Err(shape_error("bounded sequence", other)),
        }
    }

    /// Identity for sequences of sequences.
    pub fn echo_nested_sequence(&self, v: Value) -> MarshalResult<Value> {
        match &v {
            Value::Sequence { elem, .. }
                if matches!(elem.canonical(), TypeTag::Sequence { .. }) =>
            {
                self.echo_sequence(v)
            }
            other => Err(shape_error("sequence of sequences", other)),
        }
    }

    /// Struct identity.
    pub fn echo_struct(&self, v: Value) -> MarshalResult<Value> {
        match v {
            Value::Struct { .. } => Ok(v),
            other => Err(shape_error("struct", &other)),
        }
    }

    /// Identity for self-referential structs (a struct holding a
    /// sequence of its own type); the value graph passes through
    /// unchanged.
    pub fn echo_recursive_struct(&self, v: Value) -> MarshalResult<Value> {
        self.echo_struct(v)
    }

    /// Replace the stored sequence. Writers replace the whole value
    /// under the lock; concurrent readers never see a torn state.
    pub fn store_sequence(&self, v: Value) -> MarshalResult<()> {
        match v {
            seq @ Value::Sequence { .. } => {
                *self.stored.lock() = Some(seq);
                Ok(())
            }
            other => Err(shape_error("sequence", &other)),
        }
    }

    /// Read the stored sequence. Before any store this fails with
    /// `NotInitialized` -- an explicit contract replacing the
    /// undefined read-before-write of the original interface.
    pub fn retrieve_sequence(&self) -> MarshalResult<Value> {
        self.stored
            .lock()
            .clone()
            .ok_or(MarshalError::NotInitialized)
    }

    /// Byte-blob identity.
    pub fn echo_opaque_blob(&self, v: Value) -> MarshalResult<Value> {
        match v {
            Value::Opaque(_) => Ok(v),
            other => Err(shape_error("opaque", &other)),
        }
    }

    /// Fixed-array identity; dims are re-validated against the item
    /// count.
    pub fn echo_fixed_array(&self, v: Value) -> MarshalResult<Value> {
        match v {
            Value::FixedArray { elem, dims, items } => Value::fixed_array(elem, dims, items),
            other => Err(shape_error("fixed array", &other)),
        }
    }

    /// Object factory: mint and activate a fresh child identity.
    pub fn create_child_identity(&self) -> MarshalResult<ObjectRef> {
        let child = self.registry.activate(Arc::new(ChildService::new()))?;
        log::info!("created child identity {}", child.id());
        Ok(child)
    }

    // Server-side construction and alias round-trip operations.

    /// Wrap a plain unsigned long.
    pub fn wrap_ulong(&self, v: u32) -> MarshalResult<AnyValue> {
        wrap(Value::ULong(v), TypeTag::ULong)
    }

    /// Extract a plain unsigned long.
    pub fn extract_ulong(&self, container: &AnyValue) -> MarshalResult<u32> {
        let value = extract(container, &TypeTag::ULong)?;
        value.as_ulong().ok_or_else(|| MarshalError::TypeMismatch {
            expected: "ulong".to_string(),
            found: value.shape_name().to_string(),
        })
    }

    /// Wrap a long under the long-typedef alias tag.
    pub fn wrap_aliased_long(&self, v: i32) -> MarshalResult<AnyValue> {
        let aliased = Value::alias(LONG_ALIAS, Value::Long(v));
        let tag = aliased.tag_of();
        wrap(aliased, tag)
    }

    /// Extract the aliased long as a plain number; aliasing is
    /// transparent for extraction and the value is bit-exact.
    pub fn extract_aliased_long(&self, container: &AnyValue) -> MarshalResult<i32> {
        let expected = TypeTag::alias(LONG_ALIAS, TypeTag::Long);
        let value = extract(container, &expected)?;
        value.as_long().ok_or_else(|| MarshalError::TypeMismatch {
            expected: "long".to_string(),
            found: value.shape_name().to_string(),
        })
    }

    /// Wrap a text value.
    pub fn wrap_text(&self, content: &str, wide: bool) -> MarshalResult<AnyValue> {
        let value = Value::Text {
            wide,
            content: content.to_string(),
        };
        let tag = value.tag_of();
        wrap(value, tag)
    }

    /// Extract wide text content.
    pub fn extract_text(&self, container: &AnyValue) -> MarshalResult<String> {
        let value = extract(container, &TypeTag::Text { wide: true })?;
        value
            .as_text()
            .map(ToString::to_string)
            .ok_or_else(|| MarshalError::TypeMismatch {
                expected: "wtext".to_string(),
                found: value.shape_name().to_string(),
            })
    }

    /// Build an n-element wide-text sequence server-side.
    pub fn make_text_sequence(&self, content: &str, count: u32) -> MarshalResult<Value> {
        let items = (0..count)
            .map(|_| Value::wide_text(content))
            .collect();
        Value::sequence(TypeTag::Text { wide: true }, None, items)
    }

    /// Build a bounded long sequence under its typedef alias and wrap
    /// it with the alias tag. Counts above the typedef bound fail with
    /// `InvalidShape`.
    pub fn wrap_aliased_sequence(&self, count: u32, elem: i32) -> MarshalResult<AnyValue> {
        let items = (0..count).map(|_| Value::Long(elem)).collect();
        let seq = Value::sequence(TypeTag::Long, Some(LONG_SEQ_BOUND), items)?;
        let aliased = Value::alias(BOUNDED_LONG_SEQ_ALIAS, seq);
        let tag = aliased.tag_of();
        wrap(aliased, tag)
    }

    /// Build a struct whose member is an aliased long, wrapped so the
    /// alias survives inside the struct tag.
    pub fn wrap_struct_with_alias_member(&self, elem: i32) -> MarshalResult<AnyValue> {
        let value = Value::structure(
            "AliasMemberStruct",
            vec![(
                "aliased_member".to_string(),
                Value::alias(LONG_ALIAS, Value::Long(elem)),
            )],
        );
        let tag = value.tag_of();
        wrap(value, tag)
    }

    /// Build an outer-by-inner matrix of octets (a sequence of bounded
    /// octet blocks) and wrap it.
    pub fn wrap_octet_matrix(&self, outer: u32, inner: u32, elem: u8) -> MarshalResult<AnyValue> {
        let row_tag = TypeTag::sequence(TypeTag::Octet, Some(OCTET_BLOCK_BOUND));
        let mut rows = Vec::with_capacity(outer as usize);
        for _ in 0..outer {
            let cells = (0..inner).map(|_| Value::Octet(elem)).collect();
            rows.push(Value::sequence(
                TypeTag::Octet,
                Some(OCTET_BLOCK_BOUND),
                cells,
            )?);
        }
        let matrix = Value::sequence(row_tag, None, rows)?;
        let tag = matrix.tag_of();
        wrap(matrix, tag)
    }

    /// Extract the octet matrix built by [`Self::wrap_octet_matrix`].
    pub fn extract_octet_matrix(&self, container: &AnyValue) -> MarshalResult<Value> {
        let expected = TypeTag::sequence(
            TypeTag::sequence(TypeTag::Octet, Some(OCTET_BLOCK_BOUND)),
            None,
        );
        extract(container, &expected)
    }
}

fn shape_error(expected: &str, found: &Value) -> MarshalError {
    MarshalError::TypeMismatch {
        expected: expected.to_string(),
        found: found.shape_name().to_string(),
    }
}

fn scalar_wchar(v: &Value, operation: &str) -> MarshalResult<char> {
    v.as_wchar().ok_or_else(|| MarshalError::TypeMismatch {
        expected: format!("wchar argument for {}", operation),
        found: v.shape_name().to_string(),
    })
}

fn scalar_octet(v: &Value, operation: &str) -> MarshalResult<u8> {
    v.as_octet().ok_or_else(|| MarshalError::TypeMismatch {
        expected: format!("octet argument for {}", operation),
        found: v.shape_name().to_string(),
    })
}

fn scalar_long(v: &Value, operation: &str) -> MarshalResult<i32> {
    v.as_long().ok_or_else(|| MarshalError::TypeMismatch {
        expected: format!("long argument for {}", operation),
        found: v.shape_name().to_string(),
    })
}

fn scalar_ulong(v: &Value, operation: &str) -> MarshalResult<u32> {
    v.as_ulong().ok_or_else(|| MarshalError::TypeMismatch {
        expected: format!("ulong argument for {}", operation),
        found: v.shape_name().to_string(),
    })
}

fn any_arg(v: Value, operation: &str) -> MarshalResult<AnyValue> {
    match v {
        Value::Any(container) => Ok(*container),
        other => Err(MarshalError::TypeMismatch {
            expected: format!("dynamic container argument for {}", operation),
            found: other.shape_name().to_string(),
        }),
    }
}

fn text_arg(v: &Value, operation: &str) -> MarshalResult<String> {
    v.as_text()
        .map(ToString::to_string)
        .ok_or_else(|| MarshalError::TypeMismatch {
            expected: format!("text argument for {}", operation),
            found: v.shape_name().to_string(),
        })
}

/// Name-based dispatch over the operation table.
///
/// Tag-taking operations lose their explicit tag argument at this
/// boundary: `wrap_as_dynamic` derives the declared tag from the
/// argument's own (alias-preserving) tag and `extract_from_dynamic`
/// uses the container's declared tag as the expected shape. The typed
/// methods above keep the fully general signatures.
impl Servant for EchoService {
    fn dispatch(&self, operation: &str, mut args: Vec<Value>) -> MarshalResult<Option<Value>> {
        let op = operation;
        let result = match op {
            "echo_wchar" => {
                let v = take_arg(&mut args, 0, op)?;
                Some(Value::WChar(self.echo_wchar(scalar_wchar(&v, op)?)))
            }
            "echo_octet" => {
                let v = take_arg(&mut args, 0, op)?;
                Some(Value::Octet(self.echo_octet(scalar_octet(&v, op)?)))
            }
            "echo_long" => {
                let v = take_arg(&mut args, 0, op)?;
                Some(Value::Long(self.echo_long(scalar_long(&v, op)?)))
            }
            "echo_ulong" => {
                let v = take_arg(&mut args, 0, op)?;
                Some(Value::ULong(self.echo_ulong(scalar_ulong(&v, op)?)))
            }
            "echo_text" => Some(self.echo_text(take_arg(&mut args, 0, op)?)?),
            "echo_union" => Some(self.echo_union(take_arg(&mut args, 0, op)?)?),
            "echo_union_e" => Some(self.echo_union_e(take_arg(&mut args, 0, op)?)?),
            "wrap_unknown_union" => Some(Value::Any(Box::new(self.wrap_unknown_union()?))),
            "echo_any" => {
                let container = any_arg(take_arg(&mut args, 0, op)?, op)?;
                Some(Value::Any(Box::new(self.echo_any(container))))
            }
            "wrap_as_dynamic" => {
                let v = take_arg(&mut args, 0, op)?;
                let tag = v.tag_of();
                Some(Value::Any(Box::new(self.wrap_as_dynamic(v, tag)?)))
            }
            "extract_from_dynamic" => {
                let container = any_arg(take_arg(&mut args, 0, op)?, op)?;
                let expected = container.tag.clone();
                Some(self.extract_from_dynamic(&container, &expected)?)
            }
            "echo_sequence" => Some(self.echo_sequence(take_arg(&mut args, 0, op)?)?),
            "echo_bounded_sequence" => {
                Some(self.echo_bounded_sequence(take_arg(&mut args, 0, op)?)?)
            }
            "echo_nested_sequence" => {
                Some(self.echo_nested_sequence(take_arg(&mut args, 0, op)?)?)
            }
            "echo_struct" => Some(self.echo_struct(take_arg(&mut args, 0, op)?)?),
            "echo_recursive_struct" => {
                Some(self.echo_recursive_struct(take_arg(&mut args, 0, op)?)?)
            }
            "store_sequence" => {
                self.store_sequence(take_arg(&mut args, 0, op)?)?;
                None
            }
            "retrieve_sequence" => Some(self.retrieve_sequence()?),
            "echo_opaque_blob" => Some(self.echo_opaque_blob(take_arg(&mut args, 0, op)?)?),
            "echo_fixed_array" => Some(self.echo_fixed_array(take_arg(&mut args, 0, op)?)?),
            "create_child_identity" => {
                let child = self.create_child_identity()?;
                Some(Value::Opaque(child.id().raw().to_be_bytes().to_vec()))
            }
            "wrap_ulong" => {
                let v = take_arg(&mut args, 0, op)?;
                Some(Value::Any(Box::new(self.wrap_ulong(scalar_ulong(&v, op)?)?)))
            }
            "extract_ulong" => {
                let container = any_arg(take_arg(&mut args, 0, op)?, op)?;
                Some(Value::ULong(self.extract_ulong(&container)?))
            }
            "wrap_aliased_long" => {
                let v = take_arg(&mut args, 0, op)?;
                Some(Value::Any(Box::new(
                    self.wrap_aliased_long(scalar_long(&v, op)?)?,
                )))
            }
            "extract_aliased_long" => {
                let container = any_arg(take_arg(&mut args, 0, op)?, op)?;
                Some(Value::Long(self.extract_aliased_long(&container)?))
            }
            "wrap_text" => {
                let v = take_arg(&mut args, 0, op)?;
                let wide = matches!(v.unaliased(), Value::Text { wide: true, .. });
                Some(Value::Any(Box::new(self.wrap_text(&text_arg(&v, op)?, wide)?)))
            }
            "extract_text" => {
                let container = any_arg(take_arg(&mut args, 0, op)?, op)?;
                Some(Value::wide_text(self.extract_text(&container)?))
            }
            "make_text_sequence" => {
                let content = take_arg(&mut args, 0, op)?;
                let count = take_arg(&mut args, 1, op)?;
                Some(self.make_text_sequence(&text_arg(&content, op)?, scalar_ulong(&count, op)?)?)
            }
            "wrap_aliased_sequence" => {
                let count = take_arg(&mut args, 0, op)?;
                let elem = take_arg(&mut args, 1, op)?;
                Some(Value::Any(Box::new(self.wrap_aliased_sequence(
                    scalar_ulong(&count, op)?,
                    scalar_long(&elem, op)?,
                )?)))
            }
            "wrap_struct_with_alias_member" => {
                let elem = take_arg(&mut args, 0, op)?;
                Some(Value::Any(Box::new(
                    self.wrap_struct_with_alias_member(scalar_long(&elem, op)?)?,
                )))
            }
            "wrap_octet_matrix" => {
                let outer = take_arg(&mut args, 0, op)?;
                let inner = take_arg(&mut args, 1, op)?;
                let elem = take_arg(&mut args, 2, op)?;
                Some(Value::Any(Box::new(self.wrap_octet_matrix(
                    scalar_ulong(&outer, op)?,
                    scalar_ulong(&inner, op)?,
                    scalar_octet(&elem, op)?,
                )?)))
            }
            "extract_octet_matrix" => {
                let container = any_arg(take_arg(&mut args, 0, op)?, op)?;
                Some(self.extract_octet_matrix(&container)?)
            }
            other => return Err(MarshalError::UnknownOperation(other.to_string())),
        };
        Ok(result)
    }
}
