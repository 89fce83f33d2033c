//! Integration tests for snapshot loading and reference discovery.

use camino::{Utf8Path, Utf8PathBuf};
use modguard_assembly::{MetadataError, build_reference_set, discover_snapshots, load_assembly};
use modguard_domain::model::TypeRef;
use modguard_domain::resolve::MetadataResolver;
use tempfile::TempDir;

fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path")
}

fn write_file(path: &Utf8Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, contents).expect("write file");
}

const ENGINE: &str = r#"{
  "schema": "modguard.assembly.v1",
  "name": "UnityEngine",
  "types": [
    { "namespace": "UnityEngine", "name": "Object",
      "base_type": { "assembly": "mscorlib", "namespace": "System", "name": "Object" } },
    { "namespace": "UnityEngine", "name": "MonoBehaviour",
      "base_type": { "assembly": "UnityEngine", "namespace": "UnityEngine", "name": "Object" } }
  ]
}"#;

#[test]
fn discovery_is_recursive_sorted_and_json_only() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);
    write_file(&root.join("b/Second.json"), "{}");
    write_file(&root.join("a/First.json"), "{}");
    write_file(&root.join("a/notes.txt"), "ignore me");

    let found: Vec<String> = discover_snapshots(&root)
        .expect("discover")
        .iter()
        .map(|p| p.strip_prefix(&root).expect("under root").as_str().replace('\\', "/"))
        .collect();
    assert_eq!(found, vec!["a/First.json", "b/Second.json"]);
}

#[test]
fn discovery_of_missing_dir_fails() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);
    assert!(discover_snapshots(&root.join("missing")).is_err());
}

#[test]
fn reference_set_skips_malformed_snapshots() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);
    write_file(&root.join("refs/UnityEngine.json"), ENGINE);
    write_file(&root.join("refs/Broken.json"), r#"{"name": ""}"#);
    write_file(&root.join("refs/Garbage.json"), "{{{{");

    let set = build_reference_set(&[root.join("refs")]).expect("build");
    assert_eq!(set.len(), 1);

    let mono = TypeRef::new("UnityEngine", "UnityEngine", "MonoBehaviour");
    let def = set.resolve_type(&mono).expect("resolves");
    assert_eq!(
        def.base_type.as_ref().map(TypeRef::full_name).as_deref(),
        Some("UnityEngine.Object")
    );
}

#[test]
fn load_reports_io_and_validation_errors_distinctly() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);

    let missing = load_assembly(&root.join("nope.json")).unwrap_err();
    assert!(matches!(missing, MetadataError::Io { .. }));
    assert!(!missing.is_malformed());

    let dup = root.join("Dup.json");
    write_file(
        &dup,
        r#"{"name":"Dup","types":[{"namespace":"","name":"A"},{"namespace":"","name":"A"}]}"#,
    );
    let err = load_assembly(&dup).unwrap_err();
    assert!(err.is_malformed());
    assert_eq!(err.assembly(), Some("Dup"));
    assert!(err.to_string().contains("duplicate type definition A"));
}
