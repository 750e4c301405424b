//! Inspect command implementation

use anyhow::{Context, Result};
use serde::Serialize;

use vtab_format::{
    Table,
    defs::op_info::OpInfoRef,
    get_root, get_size_prefixed_root,
    root::{identifier, size_prefix},
};

use crate::commands::read_buffer;

#[derive(Debug, Serialize)]
pub struct InspectSummary {
    length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_prefix: Option<u32>,
    root_position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
    is_op_info: bool,
    root_vtable: VTableInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    op_info: Option<OpInfoSummary>,
}

#[derive(Debug, Serialize)]
struct VTableInfo {
    position: usize,
    byte_size: usize,
    table_size: usize,
    field_offsets: Vec<u16>,
}

#[derive(Debug, Serialize)]
struct OpInfoSummary {
    entry_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    op_ids: Vec<String>,
}

/// Run the inspect command
pub fn run(verbose: u8, size_prefixed: bool, sealed: bool, path: String) -> Result<()> {
    println!("Inspecting buffer: {path}");
    let buf = read_buffer(&path, sealed)?;
    let summary = summarize(&buf, size_prefixed, verbose)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Describes the buffer layout. With `verbose > 0` an OpInfo buffer also gets
/// an entry count; with `verbose > 1` the operator ids are listed.
pub fn summarize(buf: &[u8], size_prefixed: bool, verbose: u8) -> Result<InspectSummary> {
    let root = if size_prefixed {
        get_size_prefixed_root(buf, 0)
    } else {
        get_root(buf, 0)
    }
    .context("Failed to read the root offset")?;
    let root_vtable = create_vtable_info(&root)?;

    let is_op_info = OpInfoRef::buffer_has_identifier(buf, 0, size_prefixed);
    let op_info = if is_op_info && verbose > 0 {
        Some(create_op_info_summary(OpInfoRef::new(root), verbose)?)
    } else {
        None
    };

    Ok(InspectSummary {
        length: buf.len(),
        size_prefix: if size_prefixed {
            Some(size_prefix(buf, 0)?)
        } else {
            None
        },
        root_position: root.loc(),
        identifier: identifier(buf, 0, size_prefixed)
            .filter(|id| id.iter().all(u8::is_ascii_graphic))
            .map(|id| String::from_utf8_lossy(&id).into_owned()),
        is_op_info,
        root_vtable,
        op_info,
    })
}

fn create_vtable_info(table: &Table) -> Result<VTableInfo> {
    let vtable = table.vtable().context("Failed to read the root vtable")?;
    Ok(VTableInfo {
        position: vtable.pos(),
        byte_size: vtable.byte_size(),
        table_size: vtable.table_size(),
        field_offsets: vtable.entries()?,
    })
}

fn create_op_info_summary(info: OpInfoRef, verbose: u8) -> Result<OpInfoSummary> {
    let entry_count = info.op_kernel_type_str_args_len()?;
    let mut op_ids = Vec::new();
    if verbose > 1 {
        for j in 0..entry_count {
            let op_id = info
                .op_kernel_type_str_args(j)?
                .map(|entry| entry.op_id())
                .transpose()?
                .flatten();
            op_ids.push(op_id.unwrap_or("<none>").to_string());
        }
    }
    Ok(OpInfoSummary {
        entry_count,
        op_ids,
    })
}
