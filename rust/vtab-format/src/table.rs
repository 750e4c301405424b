//! Zero-copy read views over a finished buffer.
//!
//! Views are `Copy` cursors holding the borrowed buffer and a position. No
//! validation happens when a view is created; every access is bounds-checked
//! and vtables are validated when a field is looked up.

use vtab_bytes::{ReadLe, Scalar};
use vtab_common::{Result, error::Error};

use crate::{SIZE_PREFIX, SIZE_UOFFSET, vtable::VTable};

/// Follows the relative offset stored at `pos`.
#[inline]
pub fn indirect(buf: &[u8], pos: usize) -> Result<usize> {
    let offset = buf.read_u32(pos)? as usize;
    pos.checked_add(offset)
        .ok_or_else(|| Error::out_of_range(pos, offset, buf.len()))
}

/// Reads the zero-terminated UTF-8 string whose length prefix is at `pos`.
pub fn read_string(buf: &[u8], pos: usize) -> Result<&str> {
    let bytes = read_byte_vector(buf, pos)?;
    if buf.read_u8(pos + SIZE_PREFIX + bytes.len())? != 0 {
        return Err(Error::invalid_format(
            "string",
            format!("string at {pos} is not zero-terminated"),
        ));
    }
    Ok(std::str::from_utf8(bytes)?)
}

fn read_byte_vector(buf: &[u8], pos: usize) -> Result<&[u8]> {
    let len = buf.read_u32(pos)? as usize;
    buf.bytes_at(pos + SIZE_PREFIX, len)
}

/// A table located at an absolute position in a buffer.
#[derive(Debug, Clone, Copy)]
pub struct Table<'buf> {
    buf: &'buf [u8],
    loc: usize,
}

impl<'buf> Table<'buf> {
    /// Binds a view to the table at `loc`. Trusts the caller.
    #[inline]
    pub fn new(buf: &'buf [u8], loc: usize) -> Table<'buf> {
        Table { buf, loc }
    }

    #[inline]
    pub fn buf(&self) -> &'buf [u8] {
        self.buf
    }

    #[inline]
    pub fn loc(&self) -> usize {
        self.loc
    }

    pub fn vtable(&self) -> Result<VTable<'buf>> {
        VTable::for_table(self.buf, self.loc)
    }

    /// Returns the offset of the field at `slot` relative to the table, or 0
    /// if the field is absent (including slots beyond a shorter vtable).
    pub fn field_offset(&self, slot: usize) -> Result<u16> {
        self.vtable()?.field_offset(slot)
    }

    /// Absolute position of the field at `slot`, if present.
    pub fn field_pos(&self, slot: usize) -> Result<Option<usize>> {
        Ok(match self.field_offset(slot)? {
            0 => None,
            offset => Some(self.loc + offset as usize),
        })
    }

    #[inline]
    pub fn indirect(&self, pos: usize) -> Result<usize> {
        indirect(self.buf, pos)
    }

    pub fn get<T: Scalar>(&self, slot: usize, default: T) -> Result<T> {
        Ok(self.get_optional(slot)?.unwrap_or(default))
    }

    pub fn get_optional<T: Scalar>(&self, slot: usize) -> Result<Option<T>> {
        self.field_pos(slot)?
            .map(|pos| self.buf.read::<T>(pos))
            .transpose()
    }

    pub fn string(&self, slot: usize) -> Result<Option<&'buf str>> {
        match self.field_pos(slot)? {
            Some(pos) => Ok(Some(read_string(self.buf, self.indirect(pos)?)?)),
            None => Ok(None),
        }
    }

    pub fn byte_vector(&self, slot: usize) -> Result<Option<&'buf [u8]>> {
        match self.field_pos(slot)? {
            Some(pos) => Ok(Some(read_byte_vector(self.buf, self.indirect(pos)?)?)),
            None => Ok(None),
        }
    }

    /// The nested table referenced by the field at `slot`.
    pub fn table(&self, slot: usize) -> Result<Option<Table<'buf>>> {
        match self.field_pos(slot)? {
            Some(pos) => Ok(Some(Table::new(self.buf, self.indirect(pos)?))),
            None => Ok(None),
        }
    }

    /// The vector referenced by the field at `slot`.
    pub fn vector(&self, slot: usize) -> Result<Option<Vector<'buf>>> {
        match self.field_pos(slot)? {
            Some(pos) => Ok(Some(Vector::at(self.buf, self.indirect(pos)?)?)),
            None => Ok(None),
        }
    }

    /// The raw bytes of an inline struct field of `size` bytes.
    pub fn struct_bytes(&self, slot: usize, size: usize) -> Result<Option<&'buf [u8]>> {
        self.field_pos(slot)?
            .map(|pos| self.buf.bytes_at(pos, size))
            .transpose()
    }
}

/// A length-prefixed vector.
#[derive(Debug, Clone, Copy)]
pub struct Vector<'buf> {
    buf: &'buf [u8],
    /// Position of the first element.
    start: usize,
    len: usize,
}

impl<'buf> Vector<'buf> {
    /// Binds a view to the vector whose length prefix is at `pos`.
    pub fn at(buf: &'buf [u8], pos: usize) -> Result<Vector<'buf>> {
        let len = buf.read_u32(pos)? as usize;
        Ok(Vector {
            buf,
            start: pos + SIZE_PREFIX,
            len,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position of the first element.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Position of the element at `index` for elements of `elem_size` bytes.
    pub fn element_pos(&self, index: usize, elem_size: usize) -> Result<usize> {
        if index >= self.len {
            return Err(Error::out_of_range(index, 1, self.len));
        }
        Ok(self.start + index * elem_size)
    }

    pub fn get<T: Scalar>(&self, index: usize) -> Result<T> {
        self.buf.read(self.element_pos(index, T::SIZE)?)
    }

    /// The table referenced by the element at `index`.
    pub fn table(&self, index: usize) -> Result<Table<'buf>> {
        let pos = self.element_pos(index, SIZE_UOFFSET)?;
        Ok(Table::new(self.buf, indirect(self.buf, pos)?))
    }

    /// The string referenced by the element at `index`.
    pub fn string(&self, index: usize) -> Result<&'buf str> {
        let pos = self.element_pos(index, SIZE_UOFFSET)?;
        read_string(self.buf, indirect(self.buf, pos)?)
    }

    /// The inline struct of `size` bytes at `index`.
    pub fn struct_at(&self, index: usize, size: usize) -> Result<&'buf [u8]> {
        let pos = self.element_pos(index, size)?;
        self.buf.bytes_at(pos, size)
    }

    /// All element bytes, for elements of `elem_size` bytes.
    pub fn data(&self, elem_size: usize) -> Result<&'buf [u8]> {
        let size = self
            .len
            .checked_mul(elem_size)
            .ok_or_else(|| Error::out_of_range(self.start, usize::MAX, self.buf.len()))?;
        self.buf.bytes_at(self.start, size)
    }

    /// Contents of a vector of bytes.
    pub fn as_bytes(&self) -> Result<&'buf [u8]> {
        self.data(1)
    }

    pub fn tables(&self) -> impl Iterator<Item = Result<Table<'buf>>> + 'buf {
        let vector = *self;
        (0..self.len).map(move |i| vector.table(i))
    }

    pub fn strings(&self) -> impl Iterator<Item = Result<&'buf str>> + 'buf {
        let vector = *self;
        (0..self.len).map(move |i| vector.string(i))
    }
}
