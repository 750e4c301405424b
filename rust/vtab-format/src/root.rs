//! Root access: locating a buffer's root table and its file identifier.

use vtab_bytes::ReadLe;
use vtab_common::{Result, error::Error};

use crate::{FILE_IDENTIFIER_LENGTH, SIZE_PREFIX, SIZE_UOFFSET, table::Table};

/// Four-byte tag identifying the root schema of a buffer, e.g. `*b"ORTM"`.
pub type FileIdentifier = [u8; FILE_IDENTIFIER_LENGTH];

/// Returns the root table of a plain (not size-prefixed) buffer.
///
/// # Arguments
///
/// * `buf` - The buffer holding the finished table tree.
/// * `offset` - Position of the root offset within `buf`, usually 0.
///
/// # Returns
///
/// A `Table` view positioned at the root table. Its fields are checked
/// lazily, on access.
///
/// # Errors
///
/// Returns an out-of-range error if the root offset cannot be read, or if it
/// points past the addressable range.
pub fn get_root(buf: &[u8], offset: usize) -> Result<Table<'_>> {
    let root = buf.read_u32(offset)? as usize;
    let loc = offset
        .checked_add(root)
        .ok_or_else(|| Error::out_of_range(offset, root, buf.len()))?;
    Ok(Table::new(buf, loc))
}

/// Returns the root table of a size-prefixed buffer starting at `offset`.
///
/// # Errors
///
/// Same as [`get_root`]; an `offset` too large to skip the size prefix is
/// out of range.
pub fn get_size_prefixed_root(buf: &[u8], offset: usize) -> Result<Table<'_>> {
    let pos = offset
        .checked_add(SIZE_PREFIX)
        .ok_or_else(|| Error::out_of_range(offset, SIZE_PREFIX, buf.len()))?;
    get_root(buf, pos)
}

/// Reads the size prefix of a size-prefixed buffer starting at `offset`.
pub fn size_prefix(buf: &[u8], offset: usize) -> Result<u32> {
    buf.read_u32(offset)
}

/// Returns the file identifier slot of the buffer, or `None` if the buffer is
/// too short to hold one.
pub fn identifier(buf: &[u8], offset: usize, size_prefixed: bool) -> Option<FileIdentifier> {
    let mut pos = offset.checked_add(SIZE_UOFFSET)?;
    if size_prefixed {
        pos = pos.checked_add(SIZE_PREFIX)?;
    }
    let end = pos.checked_add(FILE_IDENTIFIER_LENGTH)?;
    buf.get(pos..end)?.try_into().ok()
}

/// Checks whether the buffer carries the `expected` file identifier.
///
/// Never fails: buffers too short to hold an identifier simply don't match.
pub fn buffer_has_identifier(
    buf: &[u8],
    offset: usize,
    expected: &FileIdentifier,
    size_prefixed: bool,
) -> bool {
    identifier(buf, offset, size_prefixed).as_ref() == Some(expected)
}
