//! Table definitions expressed as descriptors, with thin typed views, write
//! helpers and owned counterparts.

pub mod op_info;

pub use op_info::{
    ArgType, ArgTypeAndIndex, KernelTypeStrArgsEntry, KernelTypeStrArgsEntryRef, OpIdKernelTypeStrArgsEntry,
    OpIdKernelTypeStrArgsEntryRef, OpInfo, OpInfoRef, ORT_FILE_IDENTIFIER,
};
