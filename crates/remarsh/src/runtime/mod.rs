// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! Object runtime: identity activation and name registration.
//!
//! These are the interfaces the core needs from the remote-object
//! runtime it runs inside. Request transport lives entirely on the
//! other side of [`crate::service::Servant`].

mod naming;
mod registry;

pub use naming::{InProcessNameService, NameService, NamingError};
pub use registry::{ObjectId, ObjectRef, ObjectRegistry};
