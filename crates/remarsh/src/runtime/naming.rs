// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! Name registration.
//!
//! The naming collaborator binds a human-readable name to the root
//! identity at startup. It is external in deployment; the in-process
//! implementation here backs tests and single-process runs.

use crate::runtime::ObjectRef;
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

/// Errors from the naming collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    /// The naming service could not be contacted. At startup this is
    /// the one condition that legitimately halts the process.
    Unreachable(String),
    /// The name is not usable for binding.
    InvalidName(String),
}

impl fmt::Display for NamingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(msg) => write!(f, "naming service unreachable: {}", msg),
            Self::InvalidName(name) => write!(f, "invalid name: {:?}", name),
        }
    }
}

impl std::error::Error for NamingError {}

/// Bind names to activated identities.
pub trait NameService: Send + Sync {
    /// Bind `name` to `obj`, replacing any previous binding.
    fn rebind(&self, name: &str, obj: ObjectRef) -> Result<(), NamingError>;

    /// Look up a binding.
    fn resolve(&self, name: &str) -> Result<Option<ObjectRef>, NamingError>;
}

/// In-process name table.
#[derive(Default)]
pub struct InProcessNameService {
    table: RwLock<HashMap<String, ObjectRef>>,
}

impl InProcessNameService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NameService for InProcessNameService {
    fn rebind(&self, name: &str, obj: ObjectRef) -> Result<(), NamingError> {
        if name.is_empty() {
            return Err(NamingError::InvalidName(name.to_string()));
        }
        let mut table = self
            .table
            .write()
            .map_err(|e| NamingError::Unreachable(e.to_string()))?;
        table.insert(name.to_string(), obj);
        log::info!("bound name {:?} to {}", name, obj.id());
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<Option<ObjectRef>, NamingError> {
        let table = self
            .table
            .read()
            .map_err(|e| NamingError::Unreachable(e.to_string()))?;
        Ok(table.get(name).copied())
    }
}
