//! Sample command implementation

use anyhow::{Context, Result};
use std::{fs::File, io::BufWriter, io::Write, path::Path};

use vtab_format::{
    Builder, BuilderOptions, FinishedBuffer, checksum,
    defs::op_info::{
        ArgType, ArgTypeAndIndex, KernelTypeStrArgsEntry, OpIdKernelTypeStrArgsEntry, OpInfo,
    },
};

/// Run the sample command
pub fn run(
    entries: usize,
    size_prefixed: bool,
    sealed: bool,
    options_path: Option<String>,
    output: String,
) -> Result<()> {
    let options = match options_path {
        Some(path) => load_options(&path)?,
        None => BuilderOptions::default(),
    };
    let buf = build(entries, options, size_prefixed);
    write_output(&buf, sealed, &output)?;
    println!("Wrote {} bytes to {output}", buf.len());
    Ok(())
}

pub fn load_options(path: &str) -> Result<BuilderOptions> {
    let file = File::open(path).with_context(|| format!("Failed to open options file {path}"))?;
    serde_json::from_reader(file).with_context(|| format!("Failed to parse options file {path}"))
}

/// Generates `entries` operators. Every third operator has no kernel type
/// strings, so both present and absent vectors show up in the output.
pub fn sample_op_info(entries: usize) -> OpInfo {
    let entries = (0..entries)
        .map(|i| OpIdKernelTypeStrArgsEntry {
            op_id: Some(format!(":SampleOp{i}:{}", 1 + i % 20)),
            kernel_type_str_args: (i % 3 != 2).then(|| {
                vec![KernelTypeStrArgsEntry {
                    kernel_type_str: Some("T".to_string()),
                    args: Some(
                        (0..=(i % 4) as u32)
                            .map(|index| ArgTypeAndIndex::new(ArgType::Input, index))
                            .chain(std::iter::once(ArgTypeAndIndex::new(ArgType::Output, 0)))
                            .collect(),
                    ),
                }]
            }),
        })
        .collect();
    OpInfo {
        op_kernel_type_str_args: Some(entries),
    }
}

pub fn build(entries: usize, options: BuilderOptions, size_prefixed: bool) -> FinishedBuffer {
    sample_op_info(entries).finish(Builder::with_options(options), size_prefixed)
}

fn write_output(buf: &[u8], sealed: bool, output: impl AsRef<Path>) -> Result<()> {
    let output = output.as_ref();
    let file =
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    if sealed {
        checksum::write_sealed(buf, &mut writer)?;
    } else {
        writer.write_all(buf)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}
