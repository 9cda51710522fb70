use poppel::config::CodecConfig;
use poppel::npy::{self, HeaderAlignment, MAGIC};
use poppel::{File, FormatError, OpenMode, Order, StoreError};
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;

/// `.npy` v1.0 stream with a header that is not padded to 64 bytes.
fn misaligned_v1(values: &[u8]) -> Vec<u8> {
    let header = format!(
        "{{'descr': '|u1', 'fortran_order': False, 'shape': ({},), }}\n",
        values.len()
    );
    assert_ne!((10 + header.len()) % 64, 0);
    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(values);
    bytes
}

/// `.npy` v1.0 stream laid out the way numpy writes it.
fn aligned_v1(values: &[u8]) -> Vec<u8> {
    let mut header = format!(
        "{{'descr': '|u1', 'fortran_order': False, 'shape': ({},), }}",
        values.len()
    );
    while (10 + header.len() + 1) % 64 != 0 {
        header.push(' ');
    }
    header.push('\n');
    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(values);
    bytes
}

#[test]
fn written_payloads_use_version_three() {
    let temp_dir = TempDir::new().unwrap();
    let file = File::open(temp_dir.path().join("s.poppel"), OpenMode::CREATE_WRITE).unwrap();
    let d = file.create_dataset("d", Order::C, &[3], &[1u16, 2, 3]).unwrap();

    let bytes = fs::read(d.data_path()).unwrap();
    assert_eq!(&bytes[..6], MAGIC);
    assert_eq!(&bytes[6..8], &[3, 0]);
    let header_len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    assert_eq!((12 + header_len) % 64, 0);
    assert_eq!(bytes[12 + header_len - 1], b'\n');
    assert_eq!(bytes.len(), 12 + header_len + 6);
}

#[test]
fn numpy_style_v1_files_are_readable() {
    let temp_dir = TempDir::new().unwrap();
    let file = File::open(temp_dir.path().join("s.poppel"), OpenMode::CREATE_WRITE).unwrap();
    let d = file.create_dataset("d", Order::C, &[1], &[0u8]).unwrap();
    fs::write(d.data_path(), aligned_v1(&[4, 5, 6])).unwrap();
    assert_eq!(d.load_vec::<u8>().unwrap(), vec![4, 5, 6]);
}

#[test]
fn misaligned_header_is_advisory_by_default() {
    let bytes = misaligned_v1(&[7, 8]);
    let values: Vec<u8> = npy::load_vec(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(values, vec![7, 8]);

    let strict = npy::load_with(&mut Cursor::new(&bytes), HeaderAlignment::Strict);
    assert!(matches!(strict, Err(FormatError::MisalignedHeader(_))));
}

#[test]
fn strict_alignment_config_applies_to_dataset_reads() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("s.poppel");
    {
        let file = File::open(&path, OpenMode::CREATE_WRITE).unwrap();
        let d = file.create_dataset("d", Order::C, &[1], &[0u8]).unwrap();
        fs::write(d.data_path(), misaligned_v1(&[1, 2])).unwrap();
    }

    let lenient = File::open(&path, OpenMode::READ_ONLY).unwrap();
    assert_eq!(lenient.get_dataset("d").unwrap().load_vec::<u8>().unwrap(), vec![1, 2]);
    drop(lenient);

    let codec = CodecConfig {
        strict_alignment: true,
    };
    let strict = File::open_with_config(&path, OpenMode::READ_ONLY, &codec).unwrap();
    let d = strict.get_dataset("d").unwrap();
    assert!(matches!(
        d.load_vec::<u8>(),
        Err(StoreError::Format(FormatError::MisalignedHeader(_)))
    ));
    assert!(matches!(
        d.info(),
        Err(StoreError::Format(FormatError::MisalignedHeader(_)))
    ));
}

#[test]
fn truncated_payload_reports_io_error_with_path() {
    let temp_dir = TempDir::new().unwrap();
    let file = File::open(temp_dir.path().join("s.poppel"), OpenMode::CREATE_WRITE).unwrap();
    let d = file.create_dataset("d", Order::C, &[4], &[1i32, 2, 3, 4]).unwrap();
    let bytes = fs::read(d.data_path()).unwrap();
    fs::write(d.data_path(), &bytes[..bytes.len() - 3]).unwrap();

    match d.load_vec::<i32>() {
        Err(StoreError::Io { path, .. }) => assert_eq!(path, d.data_path()),
        other => panic!("unexpected result: {:?}", other),
    }
}
