// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! Error taxonomy for marshalling and dispatch operations.

use std::fmt;

/// Result type for marshalling operations
pub type MarshalResult<T> = Result<T, MarshalError>;

/// Errors reported by the conformance core.
///
/// Every variant carries a human-readable detail string; failures are
/// never silently coerced or truncated on their way to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshalError {
    /// A sequence or array violated its declared bound or dimensions
    InvalidShape(String),

    /// Wrap-time disagreement between the declared tag and the value's
    /// actual shape
    TypeTagMismatch { declared: String, actual: String },

    /// Extract-time disagreement between the container tag and the
    /// receiver's expected shape
    TypeMismatch { expected: String, found: String },

    /// Read of the stored sequence before any store
    NotInitialized,

    /// The identity-activation collaborator refused to mint an identity
    IdentityActivationFailed(String),

    /// No operation with this name in the dispatch table
    UnknownOperation(String),

    /// Unanticipated fault caught at the dispatch boundary
    Internal(String),
}

impl MarshalError {
    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidShape(_) => "InvalidShape",
            Self::TypeTagMismatch { .. } => "TypeTagMismatch",
            Self::TypeMismatch { .. } => "TypeMismatch",
            Self::NotInitialized => "NotInitialized",
            Self::IdentityActivationFailed(_) => "IdentityActivationFailed",
            Self::UnknownOperation(_) => "UnknownOperation",
            Self::Internal(_) => "InternalError",
        }
    }
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShape(msg) => write!(f, "Invalid shape: {}", msg),
            Self::TypeTagMismatch { declared, actual } => {
                write!(f, "Type tag mismatch: declared {}, actual {}", declared, actual)
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {}, found {}", expected, found)
            }
            Self::NotInitialized => write!(f, "Stored sequence read before any store"),
            Self::IdentityActivationFailed(msg) => {
                write!(f, "Identity activation failed: {}", msg)
            }
            Self::UnknownOperation(name) => write!(f, "Unknown operation: {}", name),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for MarshalError {}
