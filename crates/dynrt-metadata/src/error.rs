//! Metadata errors

use thiserror::Error;

/// Errors raised while loading or querying component metadata
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A dotted namespace path did not resolve to a declared namespace
    #[error("Namespace not found: {path}")]
    NamespaceNotFound {
        /// The path that was looked up
        path: String,
    },

    /// A namespace exists but has no type with the requested name
    #[error("Type not found: {namespace}.{name}")]
    TypeNotFound {
        /// Namespace that was searched
        namespace: String,
        /// Simple type name
        name: String,
    },

    /// A type carries no custom attribute with the requested name
    #[error("Attribute {attribute} not found on {type_name}")]
    AttributeNotFound {
        /// Fully qualified attribute name
        attribute: String,
        /// Fully qualified name of the type that was searched
        type_name: String,
    },

    /// A custom attribute's fixed arguments do not have the expected shape
    #[error("Malformed attribute {attribute}: {reason}")]
    MalformedAttribute {
        /// Fully qualified attribute name
        attribute: String,
        /// What was wrong with it
        reason: String,
    },

    /// An element type that has no metadata name
    #[error("Element type not supported: {0}")]
    UnsupportedElementType(String),

    /// Snapshot could not be decoded
    #[error("Invalid metadata snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot could not be read
    #[error("Failed to read metadata snapshot {path}: {source}")]
    Io {
        /// File that was being read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;
