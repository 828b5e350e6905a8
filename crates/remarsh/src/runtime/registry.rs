// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! Identity activation and lookup.
//!
//! The registry turns a servant implementation into a reachable
//! identity: every activation mints a fresh [`ObjectRef`], with no
//! deduplication across calls. The transport collaborator resolves
//! incoming requests through [`ObjectRegistry::resolve`].

use crate::error::{MarshalError, MarshalResult};
use crate::service::Servant;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Identity of an activated object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Raw identity, for encoding the reference as an opaque token.
    pub(crate) fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj-{:08x}", self.0)
    }
}

/// Opaque handle to an activated object, usable for subsequent calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    id: ObjectId,
}

impl ObjectRef {
    /// Identity this reference points at.
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

/// In-process identity table.
pub struct ObjectRegistry {
    objects: DashMap<u64, Arc<dyn Servant>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl ObjectRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            objects: DashMap::new(),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        })
    }

    /// Activate a servant, minting a fresh identity.
    ///
    /// Each call produces an independent identity even for the same
    /// servant instance.
    pub fn activate(&self, servant: Arc<dyn Servant>) -> MarshalResult<ObjectRef> {
        if self.closed.load(Ordering::Acquire) {
            return Err(MarshalError::IdentityActivationFailed(
                "registry is shut down".to_string(),
            ));
        }
        let raw = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = ObjectId(raw);
        self.objects.insert(raw, servant);
        log::debug!("activated identity {}", id);
        Ok(ObjectRef { id })
    }

    /// Resolve a reference to its servant.
    pub fn resolve(&self, obj: ObjectRef) -> Option<Arc<dyn Servant>> {
        self.objects.get(&obj.id.0).map(|entry| entry.clone())
    }

    /// Remove an identity. Returns false if it was not active.
    pub fn deactivate(&self, obj: ObjectRef) -> bool {
        let removed = self.objects.remove(&obj.id.0).is_some();
        if removed {
            log::debug!("deactivated identity {}", obj.id);
        }
        removed
    }

    /// Refuse further activations. Existing identities stay resolvable.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Number of active identities.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ChildService;

    #[test]
    fn activation_mints_independent_identities() {
        let registry = ObjectRegistry::new();
        let servant = Arc::new(ChildService::new());
        let a = registry.activate(servant.clone()).expect("activate a");
        let b = registry.activate(servant).expect("activate b");
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert!(registry.resolve(a).is_some());
        assert!(registry.resolve(b).is_some());
    }

    #[test]
    fn deactivated_identity_is_gone() {
        let registry = ObjectRegistry::new();
        let obj = registry
            .activate(Arc::new(ChildService::new()))
            .expect("activate");
        assert!(registry.deactivate(obj));
        assert!(!registry.deactivate(obj));
        assert!(registry.resolve(obj).is_none());
    }

    #[test]
    fn closed_registry_refuses_activation() {
        let registry = ObjectRegistry::new();
        registry.close();
        let err = registry
            .activate(Arc::new(ChildService::new()))
            .unwrap_err();
        assert_eq!(err.kind(), "IdentityActivationFailed");
    }
}
