use poppel::{Attributes, File, NodeKind, OpenMode, Order, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

fn create_store() -> (TempDir, PathBuf, File) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("scenario.poppel");
    let file = File::open(&path, OpenMode::CREATE_WRITE).unwrap();
    (temp_dir, path, file)
}

#[test]
fn fortran_matrix_roundtrip() {
    let (_temp_dir, path, file) = create_store();
    let matrix: Vec<f64> = vec![1.0, 4.0, 7.0, 2.0, 5.0, 8.0, 3.0, 6.0, 9.0];
    file.create_dataset("matrices/m", Order::Fortran, &[3, 3], &matrix)
        .unwrap();
    file.close();

    let file = File::open(&path, OpenMode::READ_ONLY).unwrap();
    let d = file.get_group("matrices").unwrap().get_dataset("m").unwrap();
    let info = d.info().unwrap();
    assert_eq!(info.wordsize, 8);
    assert_eq!(info.shape, vec![3, 3]);
    assert!(info.fortran_order);

    let mut out = [0.0f64; 9];
    d.load_into(Order::Fortran, &[3, 3], &mut out).unwrap();
    assert_eq!(out.to_vec(), matrix);
    assert_eq!(d.load_array().unwrap().to_vec::<f64>().unwrap(), matrix);
}

#[test]
fn utf8_text_roundtrip() {
    let (_temp_dir, _path, file) = create_store();
    let text = "Hallo/Hello/你好";
    let d = file.create_text_dataset("greeting", text).unwrap();

    let info = d.info().unwrap();
    assert_eq!(info.wordsize, 1);
    assert_eq!(info.shape, vec![text.len()]);
    assert_eq!(d.load_string().unwrap(), text);
    assert_eq!(d.load_array().unwrap().data, text.as_bytes());
}

#[test]
fn groups_cannot_live_below_datasets() {
    let (_temp_dir, _path, file) = create_store();
    file.create_dataset("d1", Order::C, &[1], &[0.5f32]).unwrap();
    assert!(matches!(
        file.create_group("d1/g1"),
        Err(StoreError::KindMismatch { expected: NodeKind::Group, found: NodeKind::Dataset, .. })
    ));
    assert!(matches!(
        file.get_dataset("d1").unwrap().node().kind(),
        NodeKind::Dataset
    ));
}

#[test]
fn missing_intermediate_groups_are_created() {
    let (_temp_dir, _path, file) = create_store();
    assert!(!file.has_group("g1").unwrap());
    file.create_group("g1/g1").unwrap();
    assert!(file.has_group("g1").unwrap());
    assert!(file.has_group("g1/g1").unwrap());
    assert!(file.get_group("g1").unwrap().has_group("g1").unwrap());
}

#[test]
fn deleting_a_group_removes_descendants() {
    let (_temp_dir, _path, file) = create_store();
    let inner = file.create_group("outer/inner").unwrap();
    let d = inner.create_dataset("values", Order::C, &[2], &[1u64, 2]).unwrap();
    d.save_attr(&json!({"unit": "count"})).unwrap();
    let data_path = d.data_path();
    let attr_path = d.attribute().unwrap().json_file;

    file.delete_group("outer").unwrap();
    assert!(!file.has_group("outer").unwrap());
    assert!(!file.has_group("outer/inner").unwrap());
    assert!(!file.has_dataset("outer/inner/values").unwrap());
    assert!(!data_path.exists());
    assert!(!attr_path.exists());
}

#[test]
fn require_twice_is_idempotent() {
    let (_temp_dir, _path, file) = create_store();
    let first = file.require_group("a/b").unwrap();
    let second = file.require_group("a/b").unwrap();
    assert_eq!(first.node(), second.node());
    assert_eq!(file.children().unwrap(), vec![("a".to_string(), NodeKind::Group)]);

    assert!(matches!(
        file.require_dataset("a/b", Order::C, &[1], &[0i8]),
        Err(StoreError::KindMismatch { .. })
    ));
}

#[test]
fn invalid_paths_are_rejected_everywhere() {
    let (_temp_dir, _path, file) = create_store();
    for name in ["", ".", "..", "/abs", "../x", "a/"] {
        assert!(matches!(file.has_group(name), Err(StoreError::InvalidPath(..))), "{:?}", name);
        assert!(matches!(file.create_group(name), Err(StoreError::InvalidPath(..))), "{:?}", name);
    }
    assert!(file.children().unwrap().is_empty());
}

#[test]
fn read_only_and_closed_stores_are_guarded() {
    let (_temp_dir, path, file) = create_store();
    file.create_group("g").unwrap();
    drop(file);

    let file = File::open(&path, OpenMode::READ_ONLY).unwrap();
    assert!(file.has_group("g").unwrap());
    assert!(matches!(file.create_group("h"), Err(StoreError::ReadOnly)));
    assert!(matches!(file.delete_group("g"), Err(StoreError::ReadOnly)));
    assert!(matches!(
        file.create_dataset("d", Order::C, &[1], &[1u8]),
        Err(StoreError::ReadOnly)
    ));

    let g = file.get_group("g").unwrap();
    file.close();
    assert!(!file.is_open());
    assert!(matches!(g.has_group("x"), Err(StoreError::Closed)));
    assert!(matches!(file.children(), Err(StoreError::Closed)));
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Provenance {
    instrument: String,
    run: u32,
}

#[test]
fn typed_attributes_roundtrip() {
    let (_temp_dir, path, file) = create_store();
    let d = file.create_dataset("d", Order::C, &[], &[3.5f32]).unwrap();
    let provenance = Provenance {
        instrument: "spectrometer".to_string(),
        run: 12,
    };
    d.save_attr(&provenance).unwrap();
    drop(file);

    let file = File::open(&path, OpenMode::READ_ONLY).unwrap();
    let d = file.get_dataset("d").unwrap();
    assert_eq!(d.load_scalar::<f32>().unwrap(), 3.5);
    assert_eq!(d.load_attr_as::<Provenance>().unwrap(), provenance);
}
