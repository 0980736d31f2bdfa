//! Dynamic invocation of component interfaces
//!
//! This crate calls methods on components whose interfaces are known only
//! from metadata at run time:
//! - **Analyze**: method signature → native [`SlotShape`]
//! - **Cache**: slot shape → prepared libffi [`CallDescriptor`], built once
//! - **Invoke**: indirect call through the component's vtable, status code
//!   checked
//! - **Dispatcher**: the three steps above driven from a [`TypeDef`](dynrt_metadata::TypeDef)
//!
//! # Example
//!
//! ```rust,ignore
//! let index = NamespaceIndex::from_store(&snapshot);
//! let stringable = index.type_def("Windows.Foundation", "IStringable")?;
//!
//! let dispatcher = Dispatcher::default();
//! let iface = unsafe { dispatcher.query_type(instance, stringable)? };
//!
//! let mut hstring: *mut c_void = std::ptr::null_mut();
//! unsafe { dispatcher.invoke_method(iface, stringable, 0, &[&mut hstring as *mut _ as *mut c_void])? };
//! ```

pub mod analyze;
pub mod cache;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod invoke;
pub mod shape;

pub use analyze::{analyze, analyze_method};
pub use cache::DescriptorCache;
pub use descriptor::{CallDescriptor, CallingConvention, DescriptorFactory, FfiFactory};
pub use dispatcher::{DispatchOptions, Dispatcher, VtableLayout, QUERY_INTERFACE_SLOT};
pub use error::{
    DescriptorBuildError, DispatchError, InvokeError, StatusError, UnsupportedReason,
    UnsupportedSignature,
};
pub use invoke::{invoke, ComponentHandle, VtableEntry};
pub use shape::{SlotKind, SlotShape};
