use std::fs;
use std::path::{self, Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

pub mod commands;

/// Resolve a directory argument against the current directory without
/// requiring it to exist (the output directory usually does not yet).
pub fn absolute_dir(arg: &str) -> Result<PathBuf> {
    path::absolute(arg).with_context(|| format!("Failed to resolve directory argument '{arg}'"))
}

/// SHA-256 of an in-memory buffer as a hex string.
pub fn sha256_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 of a file this run wrote, read back from disk.
pub fn sha256_written(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read back written file {}", path.display()))?;
    Ok(sha256_bytes(&bytes))
}
