// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! The remote-object service layer: the echo operation set, the
//! nested child identity, and the name-based dispatch boundary.

mod child;
mod dispatch;
mod echo;

pub use child::ChildService;
pub use dispatch::{dispatch_guarded, Request, Servant};
pub use echo::{
    EchoService, BOUNDED_LONG_SEQ_ALIAS, LONG_ALIAS, LONG_SEQ_BOUND, OCTET_BLOCK_BOUND,
};
