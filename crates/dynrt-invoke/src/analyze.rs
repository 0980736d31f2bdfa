//! Signature analysis: method signature to slot shape
//!
//! Only a minimal slice of the signature grammar is handled:
//!
//! | signature                       | slots                 |
//! |---------------------------------|-----------------------|
//! | `void M()`                      | receiver              |
//! | `T M()`, `T` not an array       | receiver, out-pointer |
//! | any parameters                  | rejected              |
//! | `T[] M()`                       | rejected              |
//!
//! Every return value travels through a pointer-sized out slot, whatever its
//! declared type; the call's own native return is the status code.

use dynrt_metadata::{MethodDef, MethodSig};

use crate::error::{UnsupportedReason, UnsupportedSignature};
use crate::shape::{SlotKind, SlotShape};

/// Derive the native slot shape for a signature
pub fn analyze(signature: &MethodSig) -> Result<SlotShape, UnsupportedSignature> {
    shape_of(signature).map_err(|reason| UnsupportedSignature {
        method: None,
        reason,
    })
}

/// Derive the native slot shape for a method, naming it in errors
pub fn analyze_method(method: &MethodDef) -> Result<SlotShape, UnsupportedSignature> {
    shape_of(&method.signature).map_err(|reason| UnsupportedSignature {
        method: Some(method.name.clone()),
        reason,
    })
}

fn shape_of(signature: &MethodSig) -> Result<SlotShape, UnsupportedReason> {
    // receiver
    let mut shape = SlotShape::receiver();

    if signature.has_params() {
        return Err(UnsupportedReason::Parameters(signature.params.len()));
    }

    if let Some(ret) = &signature.return_type {
        if ret.is_szarray() {
            return Err(UnsupportedReason::ArrayReturn);
        }
        shape.push(SlotKind::Pointer);
    }

    Ok(shape)
}
