//! Byte storage for the vtab format: an owned, bounds-checked byte buffer with
//! little-endian scalar access, and the same read primitives over borrowed
//! slices for zero-copy readers.

use vtab_common::{Result, error::Error};

pub mod align;
pub mod scalar;

pub use scalar::{Scalar, ScalarKind};

/// Returns the end of the `[pos, pos + size)` range if it lies within `len` bytes.
#[inline]
fn checked_end(pos: usize, size: usize, len: usize) -> Result<usize> {
    match pos.checked_add(size) {
        Some(end) if end <= len => Ok(end),
        _ => Err(Error::out_of_range(pos, size, len)),
    }
}

/// Little-endian, bounds-checked reads over a byte slice.
///
/// Every read fails with `OutOfRange` when the requested bytes are not fully
/// contained in the slice. Reads never grow or mutate the storage.
pub trait ReadLe {
    fn read<T: Scalar>(&self, pos: usize) -> Result<T>;

    /// Returns `len` bytes starting at `pos`.
    fn bytes_at(&self, pos: usize, len: usize) -> Result<&[u8]>;

    #[inline]
    fn read_u8(&self, pos: usize) -> Result<u8> {
        self.read(pos)
    }

    #[inline]
    fn read_u16(&self, pos: usize) -> Result<u16> {
        self.read(pos)
    }

    #[inline]
    fn read_i16(&self, pos: usize) -> Result<i16> {
        self.read(pos)
    }

    #[inline]
    fn read_u32(&self, pos: usize) -> Result<u32> {
        self.read(pos)
    }

    #[inline]
    fn read_i32(&self, pos: usize) -> Result<i32> {
        self.read(pos)
    }
}

impl ReadLe for [u8] {
    #[inline]
    fn read<T: Scalar>(&self, pos: usize) -> Result<T> {
        let end = checked_end(pos, T::SIZE, self.len())?;
        Ok(T::read_le(&self[pos..end]))
    }

    #[inline]
    fn bytes_at(&self, pos: usize, len: usize) -> Result<&[u8]> {
        let end = checked_end(pos, len, self.len())?;
        Ok(&self[pos..end])
    }
}

/// An owned, mutable sequence of bytes with little-endian scalar access.
///
/// Writes are bounds-checked and never grow the buffer implicitly; growth is
/// explicit through [`ByteBuffer::grow_front`], which keeps existing content
/// right-aligned so that a back-to-front writer can keep its offsets measured
/// from the end of the buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl ByteBuffer {
    /// Creates an empty buffer.
    pub fn new() -> ByteBuffer {
        ByteBuffer { data: Vec::new() }
    }

    /// Creates a buffer of `len` zero bytes.
    pub fn zeroed(len: usize) -> ByteBuffer {
        ByteBuffer { data: vec![0; len] }
    }

    pub fn from_vec(data: Vec<u8>) -> ByteBuffer {
        ByteBuffer { data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn read<T: Scalar>(&self, pos: usize) -> Result<T> {
        self.data.as_slice().read(pos)
    }

    #[inline]
    pub fn read_u32(&self, pos: usize) -> Result<u32> {
        self.read(pos)
    }

    #[inline]
    pub fn read_i16(&self, pos: usize) -> Result<i16> {
        self.read(pos)
    }

    /// Writes `value` at `pos`, failing with `OutOfRange` if it does not fit.
    #[inline]
    pub fn write<T: Scalar>(&mut self, pos: usize, value: T) -> Result<()> {
        let end = checked_end(pos, T::SIZE, self.data.len())?;
        value.write_le(&mut self.data[pos..end]);
        Ok(())
    }

    #[inline]
    pub fn write_u32(&mut self, pos: usize, value: u32) -> Result<()> {
        self.write(pos, value)
    }

    #[inline]
    pub fn write_i16(&mut self, pos: usize, value: i16) -> Result<()> {
        self.write(pos, value)
    }

    /// Writes `value` at `pos` into space the caller has already reserved.
    ///
    /// # Panics
    ///
    /// Panics if `pos + T::SIZE` exceeds the buffer length.
    #[inline]
    pub fn put<T: Scalar>(&mut self, pos: usize, value: T) {
        value.write_le(&mut self.data[pos..pos + T::SIZE]);
    }

    /// Sets `len` bytes starting at `pos` to zero.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the buffer length.
    #[inline]
    pub fn zero(&mut self, pos: usize, len: usize) {
        self.data[pos..pos + len].fill(0);
    }

    /// Reallocates the buffer to `new_len` bytes, moving the current content to
    /// the end of the new storage and zero-filling the front.
    ///
    /// Does nothing if `new_len` does not exceed the current length.
    pub fn grow_front(&mut self, new_len: usize) {
        let len = self.data.len();
        if new_len <= len {
            return;
        }
        let mut data = vec![0; new_len];
        data[new_len - len..].copy_from_slice(&self.data);
        self.data = data;
    }
}

impl std::ops::Deref for ByteBuffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        ByteBuffer::from_vec(data)
    }
}

impl From<ByteBuffer> for Vec<u8> {
    fn from(buf: ByteBuffer) -> Self {
        buf.into_vec()
    }
}
