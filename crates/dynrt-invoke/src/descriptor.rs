//! Prepared call interfaces
//!
//! A [`CallDescriptor`] wraps a libffi `ffi_cif` prepared for one slot
//! shape. The native return of every call is a 32-bit status code; logical
//! return values travel through out-pointer slots instead.

use std::fmt;

use libffi::low::{ffi_cif, ffi_type, prep_cif};
use libffi::raw::ffi_abi;

use crate::error::DescriptorBuildError;
use crate::shape::{SlotKind, SlotShape};

/// Calling convention used for indirect calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallingConvention {
    /// The platform's default C convention
    C,
    /// The convention component vtables use: `stdcall` on 32-bit Windows,
    /// the C convention everywhere else
    #[default]
    System,
}

impl CallingConvention {
    fn abi(self) -> ffi_abi {
        match self {
            CallingConvention::C => libffi::low::ffi_abi_FFI_DEFAULT_ABI,
            CallingConvention::System => system_abi(),
        }
    }
}

#[cfg(all(windows, target_arch = "x86"))]
fn system_abi() -> ffi_abi {
    libffi::raw::ffi_abi_FFI_STDCALL
}

#[cfg(not(all(windows, target_arch = "x86")))]
fn system_abi() -> ffi_abi {
    libffi::low::ffi_abi_FFI_DEFAULT_ABI
}

fn slot_type(kind: SlotKind) -> *mut ffi_type {
    match kind {
        // SAFETY: only the address of libffi's static type descriptor is taken
        SlotKind::Pointer => unsafe { std::ptr::addr_of_mut!(libffi::low::types::pointer) },
    }
}

fn status_type() -> *mut ffi_type {
    // SAFETY: as above
    unsafe { std::ptr::addr_of_mut!(libffi::low::types::sint32) }
}

/// Call interface prepared for one slot shape
pub struct CallDescriptor {
    cif: ffi_cif,
    // `cif.arg_types` points into this buffer; it must live as long as `cif`
    arg_types: Box<[*mut ffi_type]>,
    shape: SlotShape,
    convention: CallingConvention,
}

// SAFETY: after `prepare` the descriptor is never mutated. Its raw pointers
// refer to its own boxed type array and to libffi's static type descriptors.
unsafe impl Send for CallDescriptor {}
unsafe impl Sync for CallDescriptor {}

impl CallDescriptor {
    /// Prepare a call interface for `shape` with a `sint32` status return
    pub fn prepare(
        shape: &SlotShape,
        convention: CallingConvention,
    ) -> Result<Self, DescriptorBuildError> {
        let mut arg_types: Box<[*mut ffi_type]> =
            shape.kinds().iter().copied().map(slot_type).collect();

        // SAFETY: an all-zero ffi_cif is the documented pre-prep state
        let mut cif: ffi_cif = unsafe { std::mem::zeroed() };

        // SAFETY: every pointer handed to prep_cif is valid, and `arg_types`
        // moves into the descriptor without its heap buffer moving
        unsafe {
            prep_cif(
                &mut cif,
                convention.abi(),
                arg_types.len(),
                status_type(),
                arg_types.as_mut_ptr(),
            )
        }
        .map_err(|e| DescriptorBuildError {
            shape: shape.clone(),
            convention,
            reason: format!("{:?}", e),
        })?;

        Ok(CallDescriptor {
            cif,
            arg_types,
            shape: shape.clone(),
            convention,
        })
    }

    /// Number of argument slots, receiver included
    pub fn arity(&self) -> usize {
        self.arg_types.len()
    }

    /// Shape this descriptor was prepared for
    pub fn shape(&self) -> &SlotShape {
        &self.shape
    }

    /// Calling convention the descriptor is bound to
    pub fn convention(&self) -> CallingConvention {
        self.convention
    }

    /// libffi only reads the cif during a call
    pub(crate) fn cif_ptr(&self) -> *mut ffi_cif {
        &self.cif as *const ffi_cif as *mut ffi_cif
    }
}

impl fmt::Debug for CallDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallDescriptor")
            .field("shape", &self.shape)
            .field("convention", &self.convention)
            .finish()
    }
}

/// Builds descriptors for the cache
pub trait DescriptorFactory: Send + Sync {
    /// Prepare a descriptor for `shape`
    fn build(&self, shape: &SlotShape) -> Result<CallDescriptor, DescriptorBuildError>;
}

/// Factory preparing libffi call interfaces with a fixed convention
#[derive(Debug, Clone, Copy, Default)]
pub struct FfiFactory {
    convention: CallingConvention,
}

impl FfiFactory {
    /// Factory bound to `convention`
    pub fn new(convention: CallingConvention) -> Self {
        Self { convention }
    }

    /// The bound convention
    pub fn convention(&self) -> CallingConvention {
        self.convention
    }
}

impl DescriptorFactory for FfiFactory {
    fn build(&self, shape: &SlotShape) -> Result<CallDescriptor, DescriptorBuildError> {
        CallDescriptor::prepare(shape, self.convention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_records_shape() {
        let shape = SlotShape::pointers(2);
        let descriptor = CallDescriptor::prepare(&shape, CallingConvention::System).unwrap();
        assert_eq!(descriptor.arity(), 2);
        assert_eq!(descriptor.shape(), &shape);
        assert_eq!(descriptor.convention(), CallingConvention::System);
    }

    #[test]
    fn test_prepare_receiver_only() {
        let descriptor =
            CallDescriptor::prepare(&SlotShape::receiver(), CallingConvention::C).unwrap();
        assert_eq!(descriptor.arity(), 1);
    }

    #[test]
    fn test_factory_uses_its_convention() {
        let factory = FfiFactory::new(CallingConvention::C);
        let descriptor = factory.build(&SlotShape::pointers(3)).unwrap();
        assert_eq!(descriptor.convention(), CallingConvention::C);
        assert_eq!(descriptor.arity(), 3);
    }
}
