use criterion::{black_box, criterion_group, criterion_main, Criterion};
use poppel::npy::{self, Order};
use poppel::{File, OpenMode};
use std::io::Cursor;
use tempfile::TempDir;

const N: usize = 1_000_000;

fn make_data() -> Vec<f64> {
    (0..N).map(|i| i as f64).collect()
}

fn bench_encode(c: &mut Criterion) {
    let data = make_data();
    c.bench_function("encode_1M_f64", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(N * 8 + 128);
            npy::save_vec(&mut out, black_box(&data)).unwrap();
            out
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let mut bytes = Vec::new();
    npy::save_slice(&mut bytes, Order::Fortran, &[1000, 1000], &make_data()).unwrap();
    c.bench_function("decode_1M_f64", |b| {
        b.iter(|| {
            let array = npy::load(&mut Cursor::new(black_box(&bytes))).unwrap();
            array.to_vec::<f64>().unwrap()
        })
    });
    c.bench_function("decode_header_only", |b| {
        b.iter(|| npy::load_header(&mut Cursor::new(black_box(&bytes))).unwrap())
    });
}

fn bench_dataset_roundtrip(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let file = File::open(temp_dir.path().join("bench.poppel"), OpenMode::CREATE_WRITE).unwrap();
    let data = make_data();
    let dataset = file.create_dataset("d", Order::C, &[N], &data).unwrap();
    c.bench_function("dataset_save_load_1M_f64", |b| {
        b.iter(|| {
            dataset.save_slice(Order::C, &[N], black_box(&data)).unwrap();
            dataset.load_vec::<f64>().unwrap()
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_dataset_roundtrip);
criterion_main!(benches);
