//! Metadata store boundary and the JSON snapshot store
//!
//! The store reports namespaces as flat dotted names, each with the set of
//! types declared in it. Reading the binary metadata tables is the job of an
//! external reader; [`MetadataSnapshot`] holds records that reader exported.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MetadataError, MetadataResult};
use crate::model::{MemberSet, TypeDef};

/// Read-only source of namespace records
pub trait MetadataStore {
    /// Every namespace the store knows, with its members
    fn namespaces(&self) -> Box<dyn Iterator<Item = (&str, &MemberSet)> + '_>;
}

/// On-disk snapshot format: a flat list of type definitions
#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    types: Vec<TypeDef>,
}

/// In-memory metadata store built from exported type records
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "SnapshotFile")]
pub struct MetadataSnapshot {
    namespaces: BTreeMap<String, MemberSet>,
}

impl From<SnapshotFile> for MetadataSnapshot {
    fn from(file: SnapshotFile) -> Self {
        file.types.into_iter().collect()
    }
}

impl FromIterator<TypeDef> for MetadataSnapshot {
    fn from_iter<I: IntoIterator<Item = TypeDef>>(iter: I) -> Self {
        let mut snapshot = MetadataSnapshot::default();
        for def in iter {
            snapshot.insert(def);
        }
        snapshot
    }
}

impl MetadataSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a snapshot from JSON text
    pub fn from_json_str(json: &str) -> MetadataResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and decode a snapshot file
    pub fn load<P: AsRef<Path>>(path: P) -> MetadataResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Add a type under its own namespace
    pub fn insert(&mut self, def: TypeDef) {
        self.namespaces
            .entry(def.name.namespace.clone())
            .or_default()
            .insert(def);
    }

    /// Fold another snapshot into this one.
    ///
    /// Namespaces present in both are unioned; a type defined in both keeps
    /// the definition from `other`.
    pub fn merge(&mut self, other: MetadataSnapshot) {
        for (namespace, members) in other.namespaces {
            self.namespaces.entry(namespace).or_default().extend(members);
        }
    }

    /// Number of namespaces
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    /// Serialize as the snapshot JSON format
    pub fn to_json_string(&self) -> MetadataResult<String> {
        let file = SnapshotFile {
            types: self
                .namespaces
                .values()
                .flat_map(|members| members.types().cloned())
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

impl MetadataStore for MetadataSnapshot {
    fn namespaces(&self) -> Box<dyn Iterator<Item = (&str, &MemberSet)> + '_> {
        Box::new(self.namespaces.iter().map(|(ns, m)| (ns.as_str(), m)))
    }
}
