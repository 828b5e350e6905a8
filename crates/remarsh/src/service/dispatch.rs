// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! Name-based dispatch boundary.
//!
//! The transport collaborator delivers a decoded [`Request`] to a
//! [`Servant`]; everything below this line is pure computation over
//! already-decoded values. [`dispatch_guarded`] is the outermost
//! boundary: unanticipated panics surface as a structured
//! `InternalError` instead of tearing the process down.

use crate::error::{MarshalError, MarshalResult};
use crate::value::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// A decoded invocation: operation name plus arguments conforming to
/// that operation's declared shapes.
#[derive(Debug, Clone)]
pub struct Request {
    pub operation: String,
    pub args: Vec<Value>,
}

impl Request {
    pub fn new(operation: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            operation: operation.into(),
            args,
        }
    }
}

/// An object reachable through the dispatch table.
///
/// `Ok(None)` is a void result. Unknown operation names fail with
/// `UnknownOperation`.
pub trait Servant: Send + Sync + 'static {
    fn dispatch(&self, operation: &str, args: Vec<Value>) -> MarshalResult<Option<Value>>;
}

/// Dispatch a request, converting panics into `InternalError`.
pub fn dispatch_guarded(servant: &dyn Servant, request: &Request) -> MarshalResult<Option<Value>> {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        servant.dispatch(&request.operation, request.args.clone())
    }));
    match outcome {
        Ok(result) => {
            if let Err(ref err) = result {
                log::debug!("operation {} failed: {}", request.operation, err);
            }
            result
        }
        Err(panic) => {
            let detail = panic_detail(&panic);
            log::error!("operation {} panicked: {}", request.operation, detail);
            Err(MarshalError::Internal(detail))
        }
    }
}

fn panic_detail(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Pull the n-th argument out of a dispatch call.
pub(crate) fn take_arg(args: &mut Vec<Value>, index: usize, operation: &str) -> MarshalResult<Value> {
    if index < args.len() {
        // Replace instead of remove so earlier indices stay valid.
        Ok(std::mem::replace(&mut args[index], Value::Octet(0)))
    } else {
        Err(MarshalError::InvalidShape(format!(
            "{} requires at least {} argument(s), got {}",
            operation,
            index + 1,
            args.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Panicky;

    impl Servant for Panicky {
        fn dispatch(&self, operation: &str, _args: Vec<Value>) -> MarshalResult<Option<Value>> {
            match operation {
                "boom" => panic!("intentional fault"),
                other => Err(MarshalError::UnknownOperation(other.to_string())),
            }
        }
    }

    #[test]
    fn panic_becomes_internal_error() {
        let servant = Panicky;
        let err = dispatch_guarded(&servant, &Request::new("boom", vec![])).unwrap_err();
        match err {
            MarshalError::Internal(detail) => assert!(detail.contains("intentional fault")),
            other => panic!("expected Internal, got {:?}", other),
        }
    }

    #[test]
    fn unknown_operation_is_reported_structurally() {
        let servant = Panicky;
        let err = dispatch_guarded(&servant, &Request::new("missing", vec![])).unwrap_err();
        assert_eq!(err, MarshalError::UnknownOperation("missing".to_string()));
    }
}
