//! Shared test helpers for the atomicfile integration tests.
#![allow(dead_code)]

use std::path::Path;

/// Sorted entry names of `dir`.
pub fn listdir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read_dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Create a temporary directory for a test.
pub fn with_temp_root() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}
