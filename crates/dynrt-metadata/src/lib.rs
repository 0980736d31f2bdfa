//! Component metadata for dynamic dispatch
//!
//! This crate provides:
//! - **Model**: type definitions, method signatures and custom attributes
//! - **Store**: the [`MetadataStore`] boundary and a JSON snapshot store
//! - **Index**: a hierarchical namespace tree over the store's flat names
//! - **Guid**: interface identifiers decoded from `GuidAttribute`

pub mod error;
pub mod guid;
pub mod index;
pub mod model;
pub mod names;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use guid::Guid;
pub use index::{NamespaceIndex, NamespaceNode};
pub use model::{
    CustomAttribute, ElementType, FixedArg, MemberSet, MethodDef, MethodSig, ParamSig, TypeDef,
    TypeKind, TypeName, TypeSig,
};
pub use names::type_name;
pub use store::{MetadataSnapshot, MetadataStore};
