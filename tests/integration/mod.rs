//! Integration tests for poppel array stores

mod npy_files;
mod scenarios;
mod store_layout;
