//! Hierarchical namespace index
//!
//! The metadata store reports namespaces as flat dotted names
//! (`Windows.Data.Json`). The index splits them into segments once and keeps
//! a tree keyed by segment, so resolving a path walks one map per segment
//! instead of rescanning every namespace.
//!
//! ```text
//! (root)
//!  └─ Windows
//!      ├─ Data
//!      │   └─ Json        ← members of "Windows.Data.Json"
//!      └─ Foundation      ← members of "Windows.Foundation"
//! ```
//!
//! Nodes are owned by their parent. The tree is never mutated after
//! [`NamespaceIndex::build`], so shared lookups need no locking.

use rustc_hash::FxHashMap;

use crate::error::{MetadataError, MetadataResult};
use crate::model::{MemberSet, TypeDef};
use crate::store::MetadataStore;

/// Separator between namespace segments
pub const NAMESPACE_SEPARATOR: char = '.';

/// One namespace segment and everything beneath it
#[derive(Debug, Default)]
pub struct NamespaceNode {
    children: FxHashMap<String, NamespaceNode>,
    members: MemberSet,
    declared: bool,
}

impl NamespaceNode {
    /// Child namespace with the given segment name
    pub fn child(&self, segment: &str) -> Option<&NamespaceNode> {
        self.children.get(segment)
    }

    /// Iterate over child namespaces (unordered)
    pub fn children(&self) -> impl Iterator<Item = (&str, &NamespaceNode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Types declared directly in this namespace
    pub fn members(&self) -> &MemberSet {
        &self.members
    }

    /// Whether the store reported this exact namespace, as opposed to the
    /// node only existing as a prefix of a deeper one
    pub fn is_declared(&self) -> bool {
        self.declared
    }

    fn count(&self) -> usize {
        1 + self.children.values().map(NamespaceNode::count).sum::<usize>()
    }
}

/// Namespace tree built from a metadata snapshot
#[derive(Debug, Default)]
pub struct NamespaceIndex {
    root: NamespaceNode,
}

impl NamespaceIndex {
    /// Build the tree from flat `(path, members)` pairs.
    ///
    /// Missing intermediate nodes are created with empty member sets. When a
    /// path is reported more than once the last member set wins.
    pub fn build<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = (S, MemberSet)>,
        S: AsRef<str>,
    {
        let mut root = NamespaceNode::default();
        let mut declared = 0usize;

        for (path, members) in namespaces {
            let mut node = &mut root;
            for segment in path.as_ref().split(NAMESPACE_SEPARATOR) {
                node = node.children.entry(segment.to_string()).or_default();
            }
            node.members = members;
            node.declared = true;
            declared += 1;
        }

        let index = NamespaceIndex { root };
        tracing::debug!(
            target: "dynrt::index",
            declared,
            nodes = index.root.count() - 1,
            "namespace index built"
        );
        index
    }

    /// Build the tree from everything a store reports
    pub fn from_store(store: &dyn MetadataStore) -> Self {
        Self::build(
            store
                .namespaces()
                .map(|(path, members)| (path, members.clone())),
        )
    }

    /// Node for a dotted path, including intermediate nodes.
    ///
    /// Never creates nodes; any missing segment yields `None`.
    pub fn node(&self, path: &str) -> Option<&NamespaceNode> {
        path.split(NAMESPACE_SEPARATOR)
            .try_fold(&self.root, |node, segment| node.child(segment))
    }

    /// Members of a declared namespace, or `None`
    pub fn find(&self, path: &str) -> Option<&MemberSet> {
        self.node(path)
            .filter(|node| node.declared)
            .map(NamespaceNode::members)
    }

    /// Members of a declared namespace, failing with `NamespaceNotFound`
    pub fn lookup(&self, path: &str) -> MetadataResult<&MemberSet> {
        self.find(path).ok_or_else(|| MetadataError::NamespaceNotFound {
            path: path.to_string(),
        })
    }

    /// Resolve a type by namespace and simple name
    pub fn type_def(&self, namespace: &str, name: &str) -> MetadataResult<&TypeDef> {
        self.lookup(namespace)?.type_def(namespace, name)
    }

    /// Top-level namespace segments
    pub fn roots(&self) -> impl Iterator<Item = (&str, &NamespaceNode)> {
        self.root.children()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TypeDef, TypeKind, TypeName};

    fn members(ns: &str, names: &[&str]) -> MemberSet {
        names
            .iter()
            .map(|name| TypeDef {
                name: TypeName::new(ns, *name),
                kind: TypeKind::Interface,
                interfaces: vec![],
                methods: vec![],
                attributes: vec![],
            })
            .collect()
    }

    fn sample() -> NamespaceIndex {
        NamespaceIndex::build(vec![
            ("A.B.C", members("A.B.C", &["IC"])),
            ("A.B.D", members("A.B.D", &["ID"])),
            ("X", members("X", &["IX"])),
        ])
    }

    #[test]
    fn test_lookup_declared_paths() {
        let index = sample();
        assert!(index.lookup("A.B.C").unwrap().get("IC").is_some());
        assert!(index.lookup("A.B.D").unwrap().get("ID").is_some());
        assert!(index.lookup("X").unwrap().get("IX").is_some());
    }

    #[test]
    fn test_intermediate_nodes_are_shared() {
        let index = sample();
        assert_eq!(index.roots().count(), 2);

        let ab = index.node("A.B").unwrap();
        let mut children: Vec<&str> = ab.children().map(|(name, _)| name).collect();
        children.sort_unstable();
        assert_eq!(children, vec!["C", "D"]);

        assert!(std::ptr::eq(
            index.node("A.B.C").unwrap(),
            ab.child("C").unwrap()
        ));
        assert!(std::ptr::eq(
            index.node("A").unwrap().child("B").unwrap(),
            ab
        ));
    }

    #[test]
    fn test_undeclared_intermediate_is_not_found() {
        let index = sample();
        assert!(index.node("A.B").is_some());
        assert!(!index.node("A.B").unwrap().is_declared());
        match index.lookup("A.B") {
            Err(MetadataError::NamespaceNotFound { path }) => assert_eq!(path, "A.B"),
            other => panic!("Expected NamespaceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_near_misses_are_not_found() {
        let index = sample();
        for path in ["a.b.c", "A.b.C", "A.B.C.E", "B.C", "A..C", "", "A.B.C.", "x"] {
            assert!(index.find(path).is_none(), "{:?} should not resolve", path);
        }
    }

    #[test]
    fn test_declared_parent_and_child() {
        let collections = "Windows.Foundation.Collections";
        let index = NamespaceIndex::build(vec![
            (collections, members(collections, &["IVector`1"])),
            ("Windows.Foundation", members("Windows.Foundation", &["IStringable"])),
        ]);
        assert!(index
            .lookup("Windows.Foundation")
            .unwrap()
            .get("IStringable")
            .is_some());
        assert!(index
            .lookup(collections)
            .unwrap()
            .get("IVector`1")
            .is_some());
        assert!(index.lookup("Windows").is_err());
    }

    #[test]
    fn test_repeated_path_last_wins() {
        let index = NamespaceIndex::build(vec![
            ("N", members("N", &["IOld"])),
            ("N", members("N", &["INew"])),
        ]);
        let set = index.lookup("N").unwrap();
        assert!(set.get("INew").is_some());
        assert!(set.get("IOld").is_none());
    }

    #[test]
    fn test_type_def_resolution() {
        let index = sample();
        assert_eq!(index.type_def("A.B.C", "IC").unwrap().name.name, "IC");
        assert!(matches!(
            index.type_def("A.B.C", "ID"),
            Err(MetadataError::TypeNotFound { .. })
        ));
        assert!(matches!(
            index.type_def("A.B.E", "IC"),
            Err(MetadataError::NamespaceNotFound { .. })
        ));
    }
}
