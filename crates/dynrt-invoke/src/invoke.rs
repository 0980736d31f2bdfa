//! Indirect calls through a component's virtual dispatch table
//!
//! Memory layout assumed at the component boundary:
//!
//! ```text
//! component ──► [ vtable* | ...instance data... ]
//!                  │
//!                  ▼
//!               [ fn0 | fn1 | ... | fnN ]     fn(this, out...) -> i32
//! ```

use std::ffi::c_void;
use std::ptr::NonNull;

use libffi::raw::{ffi_arg, ffi_call};

use crate::descriptor::CallDescriptor;
use crate::error::{InvokeError, StatusError};

/// One dispatch table entry; `None` is a null slot
pub type VtableEntry = Option<unsafe extern "C" fn()>;

/// Non-null pointer to an activated component instance.
///
/// The handle does not own the component and never touches its reference
/// count; the caller keeps the instance alive for the duration of a call.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentHandle(NonNull<c_void>);

impl ComponentHandle {
    /// Wrap a raw interface pointer; `None` if it is null
    pub fn from_raw(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(ComponentHandle)
    }

    /// The raw interface pointer
    pub fn as_raw(self) -> *mut c_void {
        self.0.as_ptr()
    }

    /// Read the dispatch table pointer from the component's first word.
    ///
    /// # Safety
    /// The handle must point to a live component whose first machine word is
    /// a vtable pointer.
    pub unsafe fn vtable(self) -> *const VtableEntry {
        *(self.as_raw() as *const *const VtableEntry)
    }
}

/// Call the vtable entry at `vtable_offset` through `descriptor`.
///
/// Slot 0 receives the component pointer; slot `i` receives `args[i - 1]`.
/// Out-pointers in `args` are written by the callee. The callee's native
/// return is a status code: zero succeeds, anything else is returned as
/// [`StatusError`] without interpretation.
///
/// # Safety
/// - `component` must be a live component with a valid dispatch table
/// - `vtable_offset` must be within that table
/// - the entry's native signature must match `descriptor`
/// - every pointer in `args` must be valid for the callee's use
pub unsafe fn invoke(
    descriptor: &CallDescriptor,
    component: ComponentHandle,
    vtable_offset: usize,
    args: &[*mut c_void],
) -> Result<(), InvokeError> {
    let expected = descriptor.arity();
    if args.len() + 1 != expected {
        return Err(InvokeError::Arity {
            expected,
            actual: args.len() + 1,
        });
    }

    let entry = *component.vtable().add(vtable_offset);
    let Some(entry) = entry else {
        return Err(InvokeError::NullEntry {
            offset: vtable_offset,
        });
    };

    // libffi takes the address of each argument value
    let mut receiver = component.as_raw();
    let mut values: Vec<*mut c_void> = Vec::with_capacity(expected);
    values.push(&mut receiver as *mut *mut c_void as *mut c_void);
    values.extend(args.iter().map(|arg| arg as *const *mut c_void as *mut c_void));

    // Integral returns are widened to ffi_arg
    let mut status: ffi_arg = 0;
    ffi_call(
        descriptor.cif_ptr(),
        Some(entry),
        &mut status as *mut ffi_arg as *mut c_void,
        values.as_mut_ptr(),
    );

    match status as i32 {
        0 => Ok(()),
        code => Err(StatusError(code).into()),
    }
}
