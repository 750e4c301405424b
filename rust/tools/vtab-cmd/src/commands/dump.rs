//! Dump command implementation

use anyhow::{Context, Result};
use serde_json::Value;

use vtab_format::defs::op_info::OpInfoRef;

use crate::commands::read_buffer;

/// Run the dump command
pub fn run(size_prefixed: bool, sealed: bool, path: String) -> Result<()> {
    let buf = read_buffer(&path, sealed)?;
    let json = render(&buf, size_prefixed)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Verifies the buffer as an OpInfo tree and renders it as JSON.
pub fn render(buf: &[u8], size_prefixed: bool) -> Result<Value> {
    if !OpInfoRef::buffer_has_identifier(buf, 0, size_prefixed) {
        log::warn!("buffer does not carry the OpInfo file identifier");
    }
    let info = if size_prefixed {
        OpInfoRef::from_size_prefixed_root(buf, 0)
    } else {
        OpInfoRef::from_root(buf, 0)
    }
    .context("Failed to open the root table")?;
    info.verify().context("Buffer failed verification")?;
    Ok(info.to_json()?)
}
