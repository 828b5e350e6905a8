// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! Value model: the tagged-value representation and its runtime type
//! tags.

mod model;
mod tag;

pub use model::Value;
pub use tag::TypeTag;
