// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! remarsh is a typed-value marshalling conformance harness.
//!
//! The crate models the value shapes of a classic distributed-object
//! protocol (scalars, text, sequences, arrays, structs, discriminated
//! unions, typedef aliases, opaque blobs) and a self-describing
//! dynamic container that carries a value together with its runtime
//! type tag. On top of the model sits an echo servant: one identity
//! operation per shape, explicit wrap/extract operations for the
//! dynamic container, a stored-sequence state contract, and an object
//! factory that mints nested identities.
//!
//! The crate is transport-agnostic. A hosting process decodes requests
//! into [`Request`] values, resolves a [`Servant`] through the
//! [`ObjectRegistry`], and dispatches via [`dispatch_guarded`].
//!
//! ```
//! use remarsh::{extract, wrap, TypeTag, Value};
//!
//! let aliased = Value::alias("long_alias", Value::Long(13));
//! let tag = aliased.tag_of();
//! let container = wrap(aliased, tag).unwrap();
//!
//! // Aliasing is transparent for extraction.
//! let plain = extract(&container, &TypeTag::Long).unwrap();
//! assert_eq!(plain, Value::Long(13));
//! ```

mod codec;
mod error;
pub mod runtime;
pub mod service;
pub mod value;

pub use codec::{extract, wrap, AnyValue};
pub use error::{MarshalError, MarshalResult};
pub use runtime::{
    InProcessNameService, NameService, NamingError, ObjectId, ObjectRef, ObjectRegistry,
};
pub use service::{
    dispatch_guarded, ChildService, EchoService, Request, Servant, BOUNDED_LONG_SEQ_ALIAS,
    LONG_ALIAS, LONG_SEQ_BOUND, OCTET_BLOCK_BOUND,
};
pub use value::{TypeTag, Value};
