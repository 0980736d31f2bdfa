//! Metadata-driven method dispatch
//!
//! [`Dispatcher`] ties the pieces together: a method definition is analyzed
//! into a slot shape, the shape is turned into a cached descriptor, and the
//! method's vtable slot is called through it.

use std::ffi::c_void;
use std::ptr;
use std::sync::Arc;

use dynrt_metadata::{Guid, MethodDef, TypeDef};

use crate::analyze::analyze_method;
use crate::cache::DescriptorCache;
use crate::descriptor::{CallDescriptor, CallingConvention, DescriptorFactory, FfiFactory};
use crate::error::DispatchError;
use crate::invoke::{invoke, ComponentHandle};
use crate::shape::SlotShape;

/// Vtable slot of `QueryInterface`
pub const QUERY_INTERFACE_SLOT: usize = 0;

/// Base interface every dispatched interface derives from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VtableLayout {
    /// `IUnknown`: QueryInterface, AddRef, Release
    Unknown,
    /// `IInspectable`: the `IUnknown` slots plus GetIids,
    /// GetRuntimeClassName, GetTrustLevel
    #[default]
    Inspectable,
}

impl VtableLayout {
    /// Number of slots inherited from the base interface
    pub const fn base_slots(self) -> usize {
        match self {
            VtableLayout::Unknown => 3,
            VtableLayout::Inspectable => 6,
        }
    }

    /// Vtable offset of the interface's `index`-th declared method
    pub const fn method_slot(self, index: usize) -> usize {
        self.base_slots() + index
    }
}

/// Dispatcher configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOptions {
    /// Calling convention of the target vtables
    pub convention: CallingConvention,
    /// Base interface layout of dispatched interfaces
    pub layout: VtableLayout,
}

/// Calls interface methods described by metadata
pub struct Dispatcher<F = FfiFactory> {
    cache: DescriptorCache<F>,
    options: DispatchOptions,
}

impl Dispatcher<FfiFactory> {
    /// Dispatcher with its own descriptor cache
    pub fn new(options: DispatchOptions) -> Self {
        Self::with_cache(DescriptorCache::with_convention(options.convention), options)
    }
}

impl Default for Dispatcher<FfiFactory> {
    fn default() -> Self {
        Self::new(DispatchOptions::default())
    }
}

impl<F: DescriptorFactory> Dispatcher<F> {
    /// Dispatcher using an existing cache
    pub fn with_cache(cache: DescriptorCache<F>, options: DispatchOptions) -> Self {
        Dispatcher { cache, options }
    }

    /// The descriptor cache
    pub fn cache(&self) -> &DescriptorCache<F> {
        &self.cache
    }

    /// The configuration
    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Analyze `method` and fetch the matching descriptor
    pub fn prepare_method(
        &self,
        method: &MethodDef,
    ) -> Result<Arc<CallDescriptor>, DispatchError> {
        let shape = analyze_method(method)?;
        Ok(self.cache.get_or_build(&shape)?)
    }

    /// Call the `method_index`-th method declared by `interface`.
    ///
    /// `out_args` holds one out-pointer when the method returns a value.
    ///
    /// # Safety
    /// `component` must implement `interface` with the configured vtable
    /// layout, and each out-pointer must be valid for the callee to write.
    pub unsafe fn invoke_method(
        &self,
        component: ComponentHandle,
        interface: &TypeDef,
        method_index: usize,
        out_args: &[*mut c_void],
    ) -> Result<(), DispatchError> {
        let method = interface
            .method(method_index)
            .ok_or_else(|| DispatchError::MethodNotFound {
                type_name: interface.name.to_string(),
                index: method_index,
            })?;
        let descriptor = self.prepare_method(method)?;
        let offset = self.options.layout.method_slot(method_index);
        invoke(&descriptor, component, offset, out_args)?;
        Ok(())
    }

    /// Call an arbitrary vtable slot with a hand-built shape.
    ///
    /// # Safety
    /// As [`invoke`](crate::invoke::invoke).
    pub unsafe fn invoke_raw(
        &self,
        component: ComponentHandle,
        shape: &SlotShape,
        vtable_offset: usize,
        args: &[*mut c_void],
    ) -> Result<(), DispatchError> {
        let descriptor = self.cache.get_or_build(shape)?;
        invoke(&descriptor, component, vtable_offset, args)?;
        Ok(())
    }

    /// Ask `component` for the interface identified by `iid`.
    ///
    /// The returned handle carries the reference `QueryInterface` added;
    /// releasing it is the caller's job.
    ///
    /// # Safety
    /// `component` must be a live component whose slot 0 is `QueryInterface`.
    pub unsafe fn query_interface(
        &self,
        component: ComponentHandle,
        iid: &Guid,
    ) -> Result<ComponentHandle, DispatchError> {
        let mut result: *mut c_void = ptr::null_mut();
        self.invoke_raw(
            component,
            &SlotShape::pointers(3),
            QUERY_INTERFACE_SLOT,
            &[
                iid as *const Guid as *mut c_void,
                &mut result as *mut *mut c_void as *mut c_void,
            ],
        )?;
        ComponentHandle::from_raw(result).ok_or(DispatchError::NullInterface { iid: *iid })
    }

    /// `query_interface` for an interface described by metadata
    ///
    /// # Safety
    /// As [`query_interface`](Self::query_interface).
    pub unsafe fn query_type(
        &self,
        component: ComponentHandle,
        interface: &TypeDef,
    ) -> Result<ComponentHandle, DispatchError> {
        let iid = interface.guid()?;
        self.query_interface(component, &iid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vtable_layout_slots() {
        assert_eq!(VtableLayout::Unknown.method_slot(0), 3);
        assert_eq!(VtableLayout::Inspectable.method_slot(0), 6);
        assert_eq!(VtableLayout::Inspectable.method_slot(1), 7);
        assert_eq!(VtableLayout::default(), VtableLayout::Inspectable);
    }

    #[test]
    fn test_prepare_method_shares_descriptors() {
        use dynrt_metadata::{ElementType, MethodSig, TypeSig};

        let dispatcher = Dispatcher::default();
        let to_string = MethodDef {
            name: "ToString".to_string(),
            signature: MethodSig {
                params: vec![],
                return_type: Some(TypeSig::Element(ElementType::String)),
            },
        };
        let get_size = MethodDef {
            name: "get_Size".to_string(),
            signature: MethodSig {
                params: vec![],
                return_type: Some(TypeSig::Element(ElementType::U4)),
            },
        };

        let a = dispatcher.prepare_method(&to_string).unwrap();
        let b = dispatcher.prepare_method(&get_size).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(dispatcher.cache().builds(), 1);
    }
}
