use std::io::Write;

use dynrt_metadata::{
    MemberSet, MetadataError, MetadataSnapshot, NamespaceIndex, TypeDef, TypeKind, TypeName,
};

const FOUNDATION: &str = r#"{
    "types": [
        { "namespace": "Windows.Foundation", "name": "IStringable", "kind": "Interface",
          "attributes": [ { "type": { "namespace": "Windows.Foundation.Metadata", "name": "GuidAttribute" },
                            "fixed_args": [ { "U32": 2520162132 }, { "U16": 36534 }, { "U16": 18672 },
                                            { "U8": 171 }, { "U8": 206 }, { "U8": 193 }, { "U8": 178 },
                                            { "U8": 17 }, { "U8": 230 }, { "U8": 39 }, { "U8": 195 } ] } ],
          "methods": [ { "name": "ToString", "signature": { "return_type": { "Element": "String" } } } ] }
    ]
}"#;

const JSON: &str = r#"{
    "types": [
        { "namespace": "Windows.Data.Json", "name": "JsonObject", "kind": "Class",
          "interfaces": [
              { "Named": { "namespace": "Windows.Data.Json", "name": "IJsonObject" } },
              { "Named": { "namespace": "Windows.Data.Json", "name": "IJsonValue" } },
              { "GenericInst": {
                  "generic": { "namespace": "Windows.Foundation.Collections", "name": "IMap`2" },
                  "args": [ { "Element": "String" },
                            { "Named": { "namespace": "Windows.Data.Json", "name": "IJsonValue" } } ] } },
              { "Named": { "namespace": "Windows.Foundation", "name": "IStringable" } }
          ] },
        { "namespace": "Windows.Data.Json", "name": "IJsonValue", "kind": "Interface",
          "methods": [
              { "name": "get_ValueType", "signature": { "return_type": { "Named": { "namespace": "Windows.Data.Json", "name": "JsonValueType" } } } },
              { "name": "Stringify", "signature": { "return_type": { "Element": "String" } } }
          ] }
    ]
}"#;

fn load_merged() -> MetadataSnapshot {
    let dir = tempfile::tempdir().unwrap();
    let mut snapshot = MetadataSnapshot::new();
    for (file, text) in [("Windows.Foundation.json", FOUNDATION), ("Windows.Data.json", JSON)] {
        let path = dir.path().join(file);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(text.as_bytes()).unwrap();
        snapshot.merge(MetadataSnapshot::load(&path).unwrap());
    }
    snapshot
}

#[test]
fn test_resolve_types_from_loaded_snapshot() {
    let index = NamespaceIndex::from_store(&load_merged());

    let json_object = index.type_def("Windows.Data.Json", "JsonObject").unwrap();
    assert_eq!(json_object.kind, TypeKind::Class);
    assert_eq!(
        json_object.interface_names().unwrap(),
        vec![
            "Windows.Data.Json.IJsonObject",
            "Windows.Data.Json.IJsonValue",
            "Windows.Foundation.Collections.IMap`2<String, Windows.Data.Json.IJsonValue>",
            "Windows.Foundation.IStringable",
        ]
    );

    let stringable = index.type_def("Windows.Foundation", "IStringable").unwrap();
    assert_eq!(
        stringable.guid().unwrap().to_string(),
        "96369f54-8eb6-48f0-abce-c1b211e627c3"
    );

    let json_value = index.type_def("Windows.Data.Json", "IJsonValue").unwrap();
    assert_eq!(json_value.method(1).unwrap().name, "Stringify");
}

#[test]
fn test_missing_snapshot_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = MetadataSnapshot::load(dir.path().join("missing.json"));
    assert!(matches!(result, Err(MetadataError::Io { .. })));
}

#[test]
fn test_every_inserted_path_resolves_exactly() {
    let paths = [
        "Windows",
        "Windows.Foundation",
        "Windows.Foundation.Collections",
        "Windows.Data.Json",
        "Windows.Data.Xml.Dom",
        "Microsoft.UI.Xaml",
    ];
    let expected: Vec<MemberSet> = paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            [TypeDef {
                name: TypeName::new(*path, format!("T{}", i)),
                kind: TypeKind::Struct,
                interfaces: vec![],
                methods: vec![],
                attributes: vec![],
            }]
            .into_iter()
            .collect()
        })
        .collect();

    let index = NamespaceIndex::build(paths.iter().copied().zip(expected.iter().cloned()));

    for (path, members) in paths.iter().zip(&expected) {
        assert_eq!(index.lookup(path).unwrap(), members);

        assert!(index.find(&path.to_lowercase()).is_none());
        assert!(index.find(&path.to_uppercase()).is_none());
        assert!(index.find(&format!("{}.Extra", path)).is_none());
        if let Some((parent, _)) = path.rsplit_once('.') {
            if !paths.contains(&parent) {
                assert!(index.find(parent).is_none(), "{} is only a prefix", parent);
            }
        }
    }
}
