//! Zero-copy table format: a back-to-front builder, vtable-driven read views,
//! root access, and schema descriptors standing in for generated accessors.

pub mod builder;
pub mod checksum;
pub mod defs;
pub mod descriptor;
pub mod options;
pub mod root;
pub mod table;
pub mod vtable;
#[cfg(test)]
mod tests;

pub use builder::{Builder, FinishedBuffer, Object, Offset};
pub use descriptor::{TableDescriptor, TypedTable};
pub use options::{BuilderOptions, VerifierOptions};
pub use root::{FileIdentifier, buffer_has_identifier, get_root, get_size_prefixed_root};
pub use table::{Table, Vector};

/// Size of an unsigned offset to a table, vector or string.
pub const SIZE_UOFFSET: usize = 4;

/// Size of the signed table-to-vtable offset.
pub const SIZE_SOFFSET: usize = 4;

/// Size of a single vtable entry.
pub const SIZE_VOFFSET: usize = 2;

/// Size of the vector length prefix (and of the optional buffer size prefix).
pub const SIZE_PREFIX: usize = 4;

/// Size of the file identifier that follows the root offset.
pub const FILE_IDENTIFIER_LENGTH: usize = 4;

/// The vtable header: its own byte size followed by the table byte size.
pub const VTABLE_HEADER_SIZE: usize = 2 * SIZE_VOFFSET;

/// Largest buffer the builder is allowed to produce.
pub const MAX_BUFFER_SIZE: usize = 1 << 31;
