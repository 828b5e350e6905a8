// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! The nested identity minted by the object factory.

use crate::error::{MarshalError, MarshalResult};
use crate::service::Servant;
use crate::value::Value;

/// Servant behind `create_child_identity`.
///
/// The child interface declares no operations: its conformance value
/// is purely that an independently minted identity comes back as a
/// live, resolvable reference. Each factory call activates a fresh
/// instance.
#[derive(Debug, Default)]
pub struct ChildService;

impl ChildService {
    pub fn new() -> Self {
        Self
    }
}

impl Servant for ChildService {
    fn dispatch(&self, operation: &str, _args: Vec<Value>) -> MarshalResult<Option<Value>> {
        Err(MarshalError::UnknownOperation(operation.to_string()))
    }
}
