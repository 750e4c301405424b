//! Kernel type string resolution tables.
//!
//! For each operator id, an `OpInfo` buffer records which inputs and outputs
//! of the operator are constrained by each kernel type string:
//!
//! ```text
//! enum ArgType : int8 { INPUT = 0, OUTPUT = 1 }
//! struct ArgTypeAndIndex { arg_type: ArgType; index: uint32; }
//! table KernelTypeStrArgsEntry { kernel_type_str: string; args: [ArgTypeAndIndex]; }
//! table OpIdKernelTypeStrArgsEntry { op_id: string; kernel_type_str_args: [KernelTypeStrArgsEntry]; }
//! table OpInfo { op_kernel_type_str_args: [OpIdKernelTypeStrArgsEntry]; }
//! file_identifier "ORTM";
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vtab_bytes::{ReadLe, ScalarKind};
use vtab_common::{Result, error::Error};

use crate::{
    Builder, FinishedBuffer, Offset,
    options::VerifierOptions,
    descriptor::{
        ElementKind, FieldDescriptor, FieldKind, StructField, StructLayout, TableDescriptor,
        TypedTable,
    },
    root::FileIdentifier,
    table::Table,
};

pub const ORT_FILE_IDENTIFIER: FileIdentifier = *b"ORTM";

pub static ARG_TYPE_AND_INDEX: StructLayout = StructLayout {
    name: "ArgTypeAndIndex",
    size: ArgTypeAndIndex::SIZE,
    align: ArgTypeAndIndex::ALIGNMENT,
    fields: &[
        StructField {
            name: "arg_type",
            offset: 0,
            kind: ScalarKind::I8,
        },
        StructField {
            name: "index",
            offset: 4,
            kind: ScalarKind::U32,
        },
    ],
};

pub static KERNEL_TYPE_STR_ARGS_ENTRY: TableDescriptor = TableDescriptor {
    name: "KernelTypeStrArgsEntry",
    fields: &[
        FieldDescriptor {
            name: "kernel_type_str",
            slot: KernelTypeStrArgsEntryRef::KERNEL_TYPE_STR,
            kind: FieldKind::String,
        },
        FieldDescriptor {
            name: "args",
            slot: KernelTypeStrArgsEntryRef::ARGS,
            kind: FieldKind::Vector(ElementKind::Struct(&ARG_TYPE_AND_INDEX)),
        },
    ],
    file_identifier: None,
};

pub static OP_ID_KERNEL_TYPE_STR_ARGS_ENTRY: TableDescriptor = TableDescriptor {
    name: "OpIdKernelTypeStrArgsEntry",
    fields: &[
        FieldDescriptor {
            name: "op_id",
            slot: OpIdKernelTypeStrArgsEntryRef::OP_ID,
            kind: FieldKind::String,
        },
        FieldDescriptor {
            name: "kernel_type_str_args",
            slot: OpIdKernelTypeStrArgsEntryRef::KERNEL_TYPE_STR_ARGS,
            kind: FieldKind::Vector(ElementKind::Table(&KERNEL_TYPE_STR_ARGS_ENTRY)),
        },
    ],
    file_identifier: None,
};

pub static OP_INFO: TableDescriptor = TableDescriptor {
    name: "OpInfo",
    fields: &[FieldDescriptor {
        name: "op_kernel_type_str_args",
        slot: OpInfoRef::OP_KERNEL_TYPE_STR_ARGS,
        kind: FieldKind::Vector(ElementKind::Table(&OP_ID_KERNEL_TYPE_STR_ARGS_ENTRY)),
    }],
    file_identifier: Some(ORT_FILE_IDENTIFIER),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum ArgType {
    Input = 0,
    Output = 1,
}

impl TryFrom<i8> for ArgType {
    type Error = Error;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            0 => Ok(ArgType::Input),
            1 => Ok(ArgType::Output),
            _ => Err(Error::invalid_format(
                "ArgType",
                format!("unknown tag {value}"),
            )),
        }
    }
}

/// An input or output of an operator, by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArgTypeAndIndex {
    pub arg_type: ArgType,
    pub index: u32,
}

impl ArgTypeAndIndex {
    pub const SIZE: usize = 8;
    pub const ALIGNMENT: usize = 4;

    pub fn new(arg_type: ArgType, index: u32) -> ArgTypeAndIndex {
        ArgTypeAndIndex { arg_type, index }
    }

    /// Decodes the inline struct: `i8 arg_type`, 3 bytes of padding, `u32 index`.
    pub fn from_bytes(bytes: &[u8]) -> Result<ArgTypeAndIndex> {
        Ok(ArgTypeAndIndex {
            arg_type: ArgType::try_from(bytes.read::<i8>(0)?)?,
            index: bytes.read_u32(4)?,
        })
    }

    /// Prepends the struct body; the caller provides alignment.
    pub fn write(&self, builder: &mut Builder) {
        builder.prepend(self.index);
        builder.pad(3);
        builder.prepend(self.arg_type as i8);
    }
}

/// Read view of a `KernelTypeStrArgsEntry` table.
#[derive(Debug, Clone, Copy)]
pub struct KernelTypeStrArgsEntryRef<'buf>(TypedTable<'buf>);

impl<'buf> KernelTypeStrArgsEntryRef<'buf> {
    pub const KERNEL_TYPE_STR: usize = 0;
    pub const ARGS: usize = 1;

    pub fn new(table: Table<'buf>) -> Self {
        KernelTypeStrArgsEntryRef(TypedTable::new(table, &KERNEL_TYPE_STR_ARGS_ENTRY))
    }

    pub fn kernel_type_str(&self) -> Result<Option<&'buf str>> {
        self.0.string(Self::KERNEL_TYPE_STR)
    }

    pub fn args(&self, j: usize) -> Result<Option<ArgTypeAndIndex>> {
        self.0
            .vector(Self::ARGS)?
            .map(|args| args.struct_at(j).and_then(ArgTypeAndIndex::from_bytes))
            .transpose()
    }

    pub fn args_len(&self) -> Result<usize> {
        Ok(self.0.vector(Self::ARGS)?.map_or(0, |args| args.len()))
    }

    pub fn args_is_none(&self) -> Result<bool> {
        Ok(!self.0.is_present(Self::ARGS)?)
    }

    pub fn as_typed(&self) -> TypedTable<'buf> {
        self.0
    }
}

/// Read view of an `OpIdKernelTypeStrArgsEntry` table.
#[derive(Debug, Clone, Copy)]
pub struct OpIdKernelTypeStrArgsEntryRef<'buf>(TypedTable<'buf>);

impl<'buf> OpIdKernelTypeStrArgsEntryRef<'buf> {
    pub const OP_ID: usize = 0;
    pub const KERNEL_TYPE_STR_ARGS: usize = 1;

    pub fn new(table: Table<'buf>) -> Self {
        OpIdKernelTypeStrArgsEntryRef(TypedTable::new(
            table,
            &OP_ID_KERNEL_TYPE_STR_ARGS_ENTRY,
        ))
    }

    pub fn op_id(&self) -> Result<Option<&'buf str>> {
        self.0.string(Self::OP_ID)
    }

    pub fn kernel_type_str_args(&self, j: usize) -> Result<Option<KernelTypeStrArgsEntryRef<'buf>>> {
        self.0
            .vector(Self::KERNEL_TYPE_STR_ARGS)?
            .map(|entries| entries.table(j).map(KernelTypeStrArgsEntryRef))
            .transpose()
    }

    pub fn kernel_type_str_args_len(&self) -> Result<usize> {
        Ok(self
            .0
            .vector(Self::KERNEL_TYPE_STR_ARGS)?
            .map_or(0, |entries| entries.len()))
    }

    pub fn kernel_type_str_args_is_none(&self) -> Result<bool> {
        Ok(!self.0.is_present(Self::KERNEL_TYPE_STR_ARGS)?)
    }

    pub fn as_typed(&self) -> TypedTable<'buf> {
        self.0
    }
}

/// Read view of an `OpInfo` table, usually the root of an `ORTM` buffer.
#[derive(Debug, Clone, Copy)]
pub struct OpInfoRef<'buf>(TypedTable<'buf>);

impl<'buf> OpInfoRef<'buf> {
    pub const OP_KERNEL_TYPE_STR_ARGS: usize = 0;

    pub fn new(table: Table<'buf>) -> Self {
        OpInfoRef(TypedTable::new(table, &OP_INFO))
    }

    /// Opens the `OpInfo` whose root offset is at `offset`.
    pub fn from_root(buf: &'buf [u8], offset: usize) -> Result<Self> {
        Ok(OpInfoRef(TypedTable::from_root(buf, offset, &OP_INFO, false)?))
    }

    pub fn from_size_prefixed_root(buf: &'buf [u8], offset: usize) -> Result<Self> {
        Ok(OpInfoRef(TypedTable::from_root(buf, offset, &OP_INFO, true)?))
    }

    pub fn buffer_has_identifier(buf: &[u8], offset: usize, size_prefixed: bool) -> bool {
        TypedTable::has_identifier(buf, offset, &OP_INFO, size_prefixed)
    }

    pub fn op_kernel_type_str_args(
        &self,
        j: usize,
    ) -> Result<Option<OpIdKernelTypeStrArgsEntryRef<'buf>>> {
        self.0
            .vector(Self::OP_KERNEL_TYPE_STR_ARGS)?
            .map(|entries| entries.table(j).map(OpIdKernelTypeStrArgsEntryRef))
            .transpose()
    }

    pub fn op_kernel_type_str_args_len(&self) -> Result<usize> {
        Ok(self
            .0
            .vector(Self::OP_KERNEL_TYPE_STR_ARGS)?
            .map_or(0, |entries| entries.len()))
    }

    pub fn op_kernel_type_str_args_is_none(&self) -> Result<bool> {
        Ok(!self.0.is_present(Self::OP_KERNEL_TYPE_STR_ARGS)?)
    }

    /// Finds the entry of the operator `op_id` with a linear scan.
    pub fn find(&self, op_id: &str) -> Result<Option<OpIdKernelTypeStrArgsEntryRef<'buf>>> {
        for j in 0..self.op_kernel_type_str_args_len()? {
            if let Some(entry) = self.op_kernel_type_str_args(j)? {
                if entry.op_id()? == Some(op_id) {
                    return Ok(Some(entry));
                }
            }
        }
        Ok(None)
    }

    pub fn verify(&self) -> Result<()> {
        self.0.verify()
    }

    pub fn verify_with_options(&self, options: &VerifierOptions) -> Result<()> {
        self.0.verify_with_options(options)
    }

    pub fn to_json(&self) -> Result<Value> {
        self.0.to_json()
    }

    pub fn as_typed(&self) -> TypedTable<'buf> {
        self.0
    }
}

/// Owned `KernelTypeStrArgsEntry`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelTypeStrArgsEntry {
    pub kernel_type_str: Option<String>,
    pub args: Option<Vec<ArgTypeAndIndex>>,
}

impl KernelTypeStrArgsEntry {
    pub fn start(builder: &mut Builder) {
        builder.start_object(KERNEL_TYPE_STR_ARGS_ENTRY.num_slots());
    }

    pub fn add_kernel_type_str(builder: &mut Builder, kernel_type_str: Offset<str>) {
        builder.prepend_uoffset_relative_slot(
            KernelTypeStrArgsEntryRef::KERNEL_TYPE_STR,
            kernel_type_str,
            0,
        );
    }

    pub fn add_args(builder: &mut Builder, args: Offset<[ArgTypeAndIndex]>) {
        builder.prepend_uoffset_relative_slot(KernelTypeStrArgsEntryRef::ARGS, args, 0);
    }

    pub fn start_args_vector(builder: &mut Builder, num_elems: usize) -> u32 {
        builder.start_vector(
            ArgTypeAndIndex::SIZE,
            num_elems,
            ArgTypeAndIndex::ALIGNMENT,
        )
    }

    pub fn end(builder: &mut Builder) -> Offset<KernelTypeStrArgsEntry> {
        builder.end_object().cast()
    }

    pub fn pack(&self, builder: &mut Builder) -> Offset<KernelTypeStrArgsEntry> {
        let kernel_type_str = self
            .kernel_type_str
            .as_deref()
            .map(|s| builder.create_string(s));
        let args = self.args.as_deref().map(|args| {
            builder.create_vector_of_structs(
                args,
                ArgTypeAndIndex::ALIGNMENT,
                ArgTypeAndIndex::SIZE,
                |builder, arg| arg.write(builder),
            )
        });
        Self::start(builder);
        if let Some(kernel_type_str) = kernel_type_str {
            Self::add_kernel_type_str(builder, kernel_type_str);
        }
        if let Some(args) = args {
            Self::add_args(builder, args);
        }
        Self::end(builder)
    }

    pub fn unpack(view: KernelTypeStrArgsEntryRef) -> Result<KernelTypeStrArgsEntry> {
        let args = if view.args_is_none()? {
            None
        } else {
            Some(
                (0..view.args_len()?)
                    .filter_map(|j| view.args(j).transpose())
                    .collect::<Result<Vec<_>>>()?,
            )
        };
        Ok(KernelTypeStrArgsEntry {
            kernel_type_str: view.kernel_type_str()?.map(str::to_string),
            args,
        })
    }
}

/// Owned `OpIdKernelTypeStrArgsEntry`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpIdKernelTypeStrArgsEntry {
    pub op_id: Option<String>,
    pub kernel_type_str_args: Option<Vec<KernelTypeStrArgsEntry>>,
}

impl OpIdKernelTypeStrArgsEntry {
    pub fn start(builder: &mut Builder) {
        builder.start_object(OP_ID_KERNEL_TYPE_STR_ARGS_ENTRY.num_slots());
    }

    pub fn add_op_id(builder: &mut Builder, op_id: Offset<str>) {
        builder.prepend_uoffset_relative_slot(OpIdKernelTypeStrArgsEntryRef::OP_ID, op_id, 0);
    }

    pub fn add_kernel_type_str_args(
        builder: &mut Builder,
        entries: Offset<[Offset<KernelTypeStrArgsEntry>]>,
    ) {
        builder.prepend_uoffset_relative_slot(
            OpIdKernelTypeStrArgsEntryRef::KERNEL_TYPE_STR_ARGS,
            entries,
            0,
        );
    }

    pub fn start_kernel_type_str_args_vector(builder: &mut Builder, num_elems: usize) -> u32 {
        builder.start_vector(crate::SIZE_UOFFSET, num_elems, crate::SIZE_UOFFSET)
    }

    pub fn end(builder: &mut Builder) -> Offset<OpIdKernelTypeStrArgsEntry> {
        builder.end_object().cast()
    }

    pub fn pack(&self, builder: &mut Builder) -> Offset<OpIdKernelTypeStrArgsEntry> {
        let op_id = self.op_id.as_deref().map(|s| builder.create_string(s));
        let entries = self.kernel_type_str_args.as_deref().map(|entries| {
            let offsets = entries
                .iter()
                .map(|entry| entry.pack(builder))
                .collect::<Vec<_>>();
            builder.create_vector_of_offsets(&offsets)
        });
        Self::start(builder);
        if let Some(op_id) = op_id {
            Self::add_op_id(builder, op_id);
        }
        if let Some(entries) = entries {
            Self::add_kernel_type_str_args(builder, entries);
        }
        Self::end(builder)
    }

    pub fn unpack(view: OpIdKernelTypeStrArgsEntryRef) -> Result<OpIdKernelTypeStrArgsEntry> {
        let kernel_type_str_args = if view.kernel_type_str_args_is_none()? {
            None
        } else {
            Some(
                (0..view.kernel_type_str_args_len()?)
                    .filter_map(|j| view.kernel_type_str_args(j).transpose())
                    .map(|entry| KernelTypeStrArgsEntry::unpack(entry?))
                    .collect::<Result<Vec<_>>>()?,
            )
        };
        Ok(OpIdKernelTypeStrArgsEntry {
            op_id: view.op_id()?.map(str::to_string),
            kernel_type_str_args,
        })
    }

    /// The arguments constrained by `kernel_type_str`.
    pub fn args_for(&self, kernel_type_str: &str) -> Option<&[ArgTypeAndIndex]> {
        self.kernel_type_str_args
            .as_deref()?
            .iter()
            .find(|entry| entry.kernel_type_str.as_deref() == Some(kernel_type_str))?
            .args
            .as_deref()
    }
}

/// Owned `OpInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpInfo {
    pub op_kernel_type_str_args: Option<Vec<OpIdKernelTypeStrArgsEntry>>,
}

impl OpInfo {
    pub fn start(builder: &mut Builder) {
        builder.start_object(OP_INFO.num_slots());
    }

    pub fn add_op_kernel_type_str_args(
        builder: &mut Builder,
        entries: Offset<[Offset<OpIdKernelTypeStrArgsEntry>]>,
    ) {
        builder.prepend_uoffset_relative_slot(OpInfoRef::OP_KERNEL_TYPE_STR_ARGS, entries, 0);
    }

    pub fn start_op_kernel_type_str_args_vector(builder: &mut Builder, num_elems: usize) -> u32 {
        builder.start_vector(crate::SIZE_UOFFSET, num_elems, crate::SIZE_UOFFSET)
    }

    pub fn end(builder: &mut Builder) -> Offset<OpInfo> {
        builder.end_object().cast()
    }

    pub fn pack(&self, builder: &mut Builder) -> Offset<OpInfo> {
        let entries = self.op_kernel_type_str_args.as_deref().map(|entries| {
            let offsets = entries
                .iter()
                .map(|entry| entry.pack(builder))
                .collect::<Vec<_>>();
            builder.create_vector_of_offsets(&offsets)
        });
        Self::start(builder);
        if let Some(entries) = entries {
            Self::add_op_kernel_type_str_args(builder, entries);
        }
        Self::end(builder)
    }

    pub fn unpack(view: OpInfoRef) -> Result<OpInfo> {
        let op_kernel_type_str_args = if view.op_kernel_type_str_args_is_none()? {
            None
        } else {
            Some(
                (0..view.op_kernel_type_str_args_len()?)
                    .filter_map(|j| view.op_kernel_type_str_args(j).transpose())
                    .map(|entry| OpIdKernelTypeStrArgsEntry::unpack(entry?))
                    .collect::<Result<Vec<_>>>()?,
            )
        };
        Ok(OpInfo {
            op_kernel_type_str_args,
        })
    }

    /// Packs into `builder` and finishes an `ORTM`-identified buffer.
    pub fn finish(&self, mut builder: Builder, size_prefixed: bool) -> FinishedBuffer {
        let root = self.pack(&mut builder);
        if size_prefixed {
            builder.finish_size_prefixed(root, Some(&ORT_FILE_IDENTIFIER))
        } else {
            builder.finish(root, Some(&ORT_FILE_IDENTIFIER))
        }
    }

    pub fn to_bytes(&self) -> FinishedBuffer {
        self.finish(Builder::new(), false)
    }

    /// Verifies and decodes a buffer rooted at offset 0.
    ///
    /// # Arguments
    ///
    /// * `buf` - A finished buffer without a size prefix. The file identifier
    ///   is not required.
    ///
    /// # Returns
    ///
    /// The owned `OpInfo` tree.
    ///
    /// # Errors
    ///
    /// Fails with any error of [`TypedTable::verify`] under the default
    /// [`VerifierOptions`], or with `InvalidFormat` for an unknown `ArgType`.
    pub fn from_bytes(buf: &[u8]) -> Result<OpInfo> {
        Self::from_bytes_with_options(buf, false, &VerifierOptions::default())
    }

    pub fn from_size_prefixed_bytes(buf: &[u8]) -> Result<OpInfo> {
        Self::from_bytes_with_options(buf, true, &VerifierOptions::default())
    }

    /// Verifies `buf` within the given limits, then decodes it.
    pub fn from_bytes_with_options(
        buf: &[u8],
        size_prefixed: bool,
        options: &VerifierOptions,
    ) -> Result<OpInfo> {
        let view = if size_prefixed {
            OpInfoRef::from_size_prefixed_root(buf, 0)?
        } else {
            OpInfoRef::from_root(buf, 0)?
        };
        view.verify_with_options(options)?;
        Self::unpack(view)
    }

    pub fn entry(&self, op_id: &str) -> Option<&OpIdKernelTypeStrArgsEntry> {
        self.op_kernel_type_str_args
            .as_deref()?
            .iter()
            .find(|entry| entry.op_id.as_deref() == Some(op_id))
    }

    /// Resolves which arguments of `op_id` carry `kernel_type_str`.
    pub fn args_for(&self, op_id: &str, kernel_type_str: &str) -> Option<&[ArgTypeAndIndex]> {
        self.entry(op_id)?.args_for(kernel_type_str)
    }
}
