//! Vtables: the per-shape field offset tables, both the write-side registry
//! that shares identical vtables and the read-side view.

use ahash::AHashMap;
use vtab_bytes::ReadLe;
use vtab_common::{Result, error::Error};

use crate::{SIZE_VOFFSET, VTABLE_HEADER_SIZE};

/// Encodes a vtable: `u16 vtable_size, u16 table_size, u16 field_offsets[]`.
pub fn encode_vtable(field_offsets: &[u16], table_size: u16) -> Vec<u8> {
    let vtable_size = VTABLE_HEADER_SIZE + field_offsets.len() * SIZE_VOFFSET;
    let mut bytes = Vec::with_capacity(vtable_size);
    bytes.extend_from_slice(&(vtable_size as u16).to_le_bytes());
    bytes.extend_from_slice(&table_size.to_le_bytes());
    for offset in field_offsets {
        bytes.extend_from_slice(&offset.to_le_bytes());
    }
    bytes
}

/// Vtables already emitted by a builder, keyed by their exact bytes.
///
/// Positions are stored as offsets from the end of the builder's buffer, which
/// stay valid while the buffer grows towards the front.
#[derive(Debug, Default)]
pub struct VTableRegistry {
    written: AHashMap<Vec<u8>, u32>,
    dedup: bool,
}

impl VTableRegistry {
    pub fn new(dedup: bool) -> VTableRegistry {
        VTableRegistry {
            written: AHashMap::new(),
            dedup,
        }
    }

    /// Returns the offset of a previously written vtable with the same bytes.
    pub fn lookup(&self, bytes: &[u8]) -> Option<u32> {
        if self.dedup {
            self.written.get(bytes).copied()
        } else {
            None
        }
    }

    pub fn register(&mut self, bytes: Vec<u8>, offset: u32) {
        if self.dedup {
            self.written.entry(bytes).or_insert(offset);
        }
    }

    /// Number of distinct vtables registered so far.
    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}

/// Read-only view of a table's vtable.
///
/// Construction validates the header (both sizes, and that the whole vtable
/// lies inside the buffer); entries are checked against the table size when
/// read.
#[derive(Debug, Clone, Copy)]
pub struct VTable<'buf> {
    buf: &'buf [u8],
    pos: usize,
    byte_size: u16,
    table_size: u16,
    table: usize,
}

impl<'buf> VTable<'buf> {
    /// Follows the signed offset stored at `table` to the table's vtable.
    pub fn for_table(buf: &'buf [u8], table: usize) -> Result<VTable<'buf>> {
        let soffset = buf.read_i32(table)? as i64;
        let pos = table as i64 - soffset;
        if pos < 0 || pos as u64 > buf.len() as u64 {
            return Err(Error::malformed_vtable(
                table,
                format!("vtable offset {soffset} points outside of the buffer"),
            ));
        }
        let pos = pos as usize;
        let byte_size = buf.read_u16(pos)?;
        let table_size = buf.read_u16(pos + SIZE_VOFFSET)?;
        if (byte_size as usize) < VTABLE_HEADER_SIZE || byte_size % 2 != 0 {
            return Err(Error::malformed_vtable(
                table,
                format!("invalid vtable size {byte_size}"),
            ));
        }
        if (table_size as usize) < crate::SIZE_SOFFSET {
            return Err(Error::malformed_vtable(
                table,
                format!("invalid table size {table_size}"),
            ));
        }
        buf.bytes_at(pos, byte_size as usize)?;
        Ok(VTable {
            buf,
            pos,
            byte_size,
            table_size,
            table,
        })
    }

    /// Absolute position of the vtable in the buffer.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn byte_size(&self) -> usize {
        self.byte_size as usize
    }

    /// Size of the table's inline data, including the vtable offset.
    pub fn table_size(&self) -> usize {
        self.table_size as usize
    }

    /// Number of field slots present in this vtable.
    pub fn num_slots(&self) -> usize {
        (self.byte_size as usize - VTABLE_HEADER_SIZE) / SIZE_VOFFSET
    }

    /// Returns the offset of the field at `slot` relative to the table start,
    /// or 0 if the field is absent.
    ///
    /// Slots past the end of the vtable were not known to the writer and read
    /// as absent.
    pub fn field_offset(&self, slot: usize) -> Result<u16> {
        if slot >= self.num_slots() {
            return Ok(0);
        }
        let offset = self
            .buf
            .read_u16(self.pos + VTABLE_HEADER_SIZE + slot * SIZE_VOFFSET)?;
        if offset != 0
            && ((offset as usize) < crate::SIZE_SOFFSET || offset >= self.table_size)
        {
            return Err(Error::malformed_vtable(
                self.table,
                format!(
                    "offset {offset} of slot {slot} is outside of the table size {}",
                    self.table_size
                ),
            ));
        }
        Ok(offset)
    }

    /// All field offsets in slot order.
    pub fn entries(&self) -> Result<Vec<u16>> {
        (0..self.num_slots())
            .map(|slot| self.field_offset(slot))
            .collect()
    }
}
