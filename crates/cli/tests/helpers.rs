use std::fs;

use sha2::{Digest, Sha256};
use tempfile::tempdir;
use testport::{absolute_dir, sha256_bytes, sha256_written};

#[test]
fn absolute_dir_joins_missing_relative_path_onto_cwd() {
    let cwd = std::env::current_dir().expect("cwd");
    let result = absolute_dir("does-not-exist/out").expect("resolve");
    assert_eq!(result, cwd.join("does-not-exist/out"));
}

#[test]
fn absolute_dir_keeps_absolute_paths() {
    let tmp = tempdir().expect("tempdir");
    let nested = tmp.path().join("nested");
    let result = absolute_dir(nested.to_str().unwrap()).expect("resolve");
    assert_eq!(result, nested);
}

#[test]
fn absolute_dir_rejects_empty_argument() {
    let err = absolute_dir("").unwrap_err();
    assert!(err.to_string().contains("Failed to resolve directory argument"));
}

#[test]
fn sha256_written_matches_in_memory_digest() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("kernel.py");
    fs::write(&path, b"@triton.jit\n").expect("write");

    let expected = format!("{:x}", Sha256::digest(b"@triton.jit\n"));

    assert_eq!(sha256_bytes(b"@triton.jit\n"), expected);
    assert_eq!(sha256_written(&path).unwrap(), expected);
}

#[test]
fn sha256_written_errors_for_missing_file() {
    let tmp = tempdir().expect("tempdir");
    let err = sha256_written(&tmp.path().join("missing.py")).unwrap_err();
    assert!(err.to_string().contains("Failed to read back written file"));
}
