use poppel::{File, OpenMode, Order};
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn node_directories_carry_metadata_records() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("layout.poppel");
    let file = File::open(&root, OpenMode::CREATE_WRITE).unwrap();
    file.create_dataset("g/d", Order::C, &[2], &[1i16, 2]).unwrap();

    let root_meta = read_json(&root.join("poppel.json"));
    assert_eq!(root_meta["version"], 1);
    assert_eq!(root_meta["type"], "file");
    assert_eq!(read_json(&root.join("g").join("poppel.json"))["type"], "group");
    assert_eq!(read_json(&root.join("g").join("d").join("poppel.json"))["type"], "dataset");
    assert!(root.join("g").join("d").join("data.npy").is_file());
    assert!(!root.join("g").join("attributes.json").exists());
}

#[test]
fn records_using_kind_key_are_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("legacy.poppel");
    fs::create_dir_all(root.join("old")).unwrap();
    fs::write(root.join("poppel.json"), r#"{"version": 1, "kind": "file"}"#).unwrap();
    fs::write(root.join("old").join("poppel.json"), r#"{"version": 1, "kind": "group"}"#).unwrap();

    let file = File::open(&root, OpenMode::READ_ONLY).unwrap();
    assert!(file.has_group("old").unwrap());
}

#[test]
fn unknown_entries_are_ignored_in_listings() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("mixed.poppel");
    let file = File::open(&root, OpenMode::CREATE_WRITE).unwrap();
    file.create_group("real").unwrap();
    fs::create_dir(root.join("scratch")).unwrap();
    fs::write(root.join("notes.txt"), "hello").unwrap();

    let names: Vec<String> = file.children().unwrap().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["real".to_string()]);
    assert!(!file.has_group("scratch").unwrap());
    assert!(file.create_group("scratch").is_err());
}
