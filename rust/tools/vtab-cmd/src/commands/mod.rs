//! Command implementations for vtab-cmd

use anyhow::{Context, Result};
use std::path::Path;

use vtab_format::checksum;

pub mod dump;
pub mod inspect;
pub mod sample;

/// Reads a buffer file, unwrapping the checksummed framing when `sealed` is set.
pub fn read_buffer(path: impl AsRef<Path>, sealed: bool) -> Result<Vec<u8>> {
    let path = path.as_ref();
    if !path.is_file() {
        anyhow::bail!("Path is not a file: {}", path.display());
    }
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if !sealed {
        return Ok(data);
    }
    let payload = checksum::open(&data)
        .with_context(|| format!("Failed to open sealed message in {}", path.display()))?;
    Ok(payload.to_vec())
}
