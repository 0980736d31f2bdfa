//! Dispatch errors

use dynrt_metadata::{Guid, MetadataError};
use thiserror::Error;

use crate::descriptor::CallingConvention;
use crate::shape::SlotShape;

/// Why a signature falls outside the shapes the analyzer handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnsupportedReason {
    /// The method declares formal parameters
    #[error("{0} parameter(s) declared; parameter marshaling is not implemented")]
    Parameters(usize),

    /// The method returns a single-dimension array
    #[error("array return types are not implemented")]
    ArrayReturn,
}

/// A method signature that cannot be turned into a slot shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported signature for {}: {reason}", .method.as_deref().unwrap_or("<anonymous method>"))]
pub struct UnsupportedSignature {
    /// Method name, when known
    pub method: Option<String>,
    /// What was rejected
    pub reason: UnsupportedReason,
}

/// libffi rejected a slot shape while preparing a call interface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to prepare call interface for {shape} ({convention:?}): {reason}")]
pub struct DescriptorBuildError {
    /// Shape that was being prepared
    pub shape: SlotShape,
    /// Calling convention requested
    pub convention: CallingConvention,
    /// Reason reported by the preparation step
    pub reason: String,
}

/// Nonzero status code returned by the callee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("Call failed with status 0x{0:08x}")]
pub struct StatusError(pub i32);

impl StatusError {
    /// The raw status code
    pub fn code(&self) -> i32 {
        self.0
    }
}

/// Errors from a single indirect call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// Argument count does not match the descriptor (receiver included)
    #[error("Descriptor expects {expected} slot(s), got {actual}")]
    Arity {
        /// Slots in the descriptor
        expected: usize,
        /// Receiver plus supplied arguments
        actual: usize,
    },

    /// The vtable entry at the requested offset is null
    #[error("Vtable entry {offset} is null")]
    NullEntry {
        /// Offset that was read
        offset: usize,
    },

    /// The callee reported failure
    #[error(transparent)]
    Status(#[from] StatusError),
}

/// Errors surfaced by the [`Dispatcher`](crate::Dispatcher)
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Namespace or type resolution failed
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Signature outside the supported slice
    #[error(transparent)]
    Unsupported(#[from] UnsupportedSignature),

    /// Call interface preparation failed
    #[error(transparent)]
    DescriptorBuild(#[from] DescriptorBuildError),

    /// The indirect call failed
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    /// A type has no method at the requested index
    #[error("{type_name} has no method at index {index}")]
    MethodNotFound {
        /// Fully qualified type name
        type_name: String,
        /// Requested method index
        index: usize,
    },

    /// `QueryInterface` succeeded but produced a null interface pointer
    #[error("QueryInterface for {iid} returned a null interface")]
    NullInterface {
        /// Requested interface identifier
        iid: Guid,
    },
}

impl DispatchError {
    /// Status code of a failed call, if this error carries one
    pub fn status(&self) -> Option<StatusError> {
        match self {
            DispatchError::Invoke(InvokeError::Status(status)) => Some(*status),
            _ => None,
        }
    }
}
