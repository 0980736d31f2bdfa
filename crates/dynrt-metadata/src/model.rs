//! Records read from the metadata store
//!
//! These mirror the subset of the component metadata tables the dispatcher
//! needs: type definitions, their method signatures, implemented interfaces
//! and custom attributes.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{MetadataError, MetadataResult};

/// Namespace-qualified type name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeName {
    /// Dotted namespace the type lives in
    pub namespace: String,
    /// Simple type name
    pub name: String,
}

impl TypeName {
    /// Create a type name from its parts
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Primitive element types of the signature grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Void,
    Boolean,
    Char,
    I1,
    U1,
    I2,
    U2,
    I4,
    U4,
    I8,
    U8,
    R4,
    R8,
    String,
    Object,
}

/// A type as it appears in a method signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeSig {
    /// Primitive element type
    Element(ElementType),
    /// Reference to a type definition
    Named(TypeName),
    /// Instantiation of a generic type
    GenericInst {
        /// The generic type definition
        generic: TypeName,
        /// Type arguments, in order
        args: Vec<TypeSig>,
    },
    /// Single-dimension zero-based array
    SzArray(Box<TypeSig>),
}

impl TypeSig {
    /// Whether this is a single-dimension array type
    pub fn is_szarray(&self) -> bool {
        matches!(self, TypeSig::SzArray(_))
    }
}

/// Formal parameter of a method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSig {
    /// Parameter name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: TypeSig,
}

/// Method signature: parameters and optional return type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSig {
    /// Formal parameters, in declaration order
    #[serde(default)]
    pub params: Vec<ParamSig>,
    /// Declared return type; `None` for void methods
    #[serde(default)]
    pub return_type: Option<TypeSig>,
}

impl MethodSig {
    /// Whether the signature declares any formal parameters
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }
}

/// Method definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Method signature
    #[serde(default)]
    pub signature: MethodSig,
}

/// Fixed (positional) argument of a custom attribute blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedArg {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    I32(i32),
    U64(u64),
    String(String),
    Type(TypeName),
}

impl FixedArg {
    /// Name of the argument's kind, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            FixedArg::Bool(_) => "bool",
            FixedArg::U8(_) => "u8",
            FixedArg::U16(_) => "u16",
            FixedArg::U32(_) => "u32",
            FixedArg::I32(_) => "i32",
            FixedArg::U64(_) => "u64",
            FixedArg::String(_) => "string",
            FixedArg::Type(_) => "type",
        }
    }
}

/// Custom attribute attached to a type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAttribute {
    /// Attribute type
    #[serde(rename = "type")]
    pub ty: TypeName,
    /// Positional constructor arguments
    #[serde(default)]
    pub fixed_args: Vec<FixedArg>,
}

/// Category of a type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Struct,
    Delegate,
}

/// Type definition record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Namespace and simple name
    #[serde(flatten)]
    pub name: TypeName,
    /// Category
    pub kind: TypeKind,
    /// Implemented interfaces, in metadata order
    #[serde(default)]
    pub interfaces: Vec<TypeSig>,
    /// Methods, in vtable order
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    /// Custom attributes
    #[serde(default)]
    pub attributes: Vec<CustomAttribute>,
}

impl TypeDef {
    /// Find a custom attribute by namespace and name
    pub fn attribute(&self, namespace: &str, name: &str) -> Option<&CustomAttribute> {
        self.attributes
            .iter()
            .find(|a| a.ty.namespace == namespace && a.ty.name == name)
    }

    /// Method at `index` in declaration order
    pub fn method(&self, index: usize) -> Option<&MethodDef> {
        self.methods.get(index)
    }

    /// Find a method by name, returning its declaration index
    pub fn method_by_name(&self, name: &str) -> Option<(usize, &MethodDef)> {
        self.methods.iter().enumerate().find(|(_, m)| m.name == name)
    }
}

/// Types declared in one namespace, keyed by simple name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberSet {
    types: FxHashMap<String, TypeDef>,
}

impl MemberSet {
    /// Create an empty member set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type definition, replacing any type with the same name
    pub fn insert(&mut self, def: TypeDef) {
        self.types.insert(def.name.name.clone(), def);
    }

    /// Look up a type by simple name
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Look up a type by simple name, failing with `TypeNotFound`
    pub fn type_def(&self, namespace: &str, name: &str) -> MetadataResult<&TypeDef> {
        self.get(name).ok_or_else(|| MetadataError::TypeNotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Iterate over all types (unordered)
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Iterate over the interface types
    pub fn interfaces(&self) -> impl Iterator<Item = &TypeDef> {
        self.types().filter(|t| t.kind == TypeKind::Interface)
    }

    /// Move every type of `other` into this set; later types win
    pub fn extend(&mut self, other: MemberSet) {
        self.types.extend(other.types);
    }

    /// Number of types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the set has no types
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<TypeDef> for MemberSet {
    fn from_iter<I: IntoIterator<Item = TypeDef>>(iter: I) -> Self {
        let mut set = MemberSet::new();
        for def in iter {
            set.insert(def);
        }
        set
    }
}
