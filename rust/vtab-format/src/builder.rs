//! Back-to-front buffer builder.
//!
//! Data is written from the end of the buffer towards its start, so every
//! child (string, vector, nested table) is written before the object that
//! references it, and references always point forward in the finished buffer.
//! Positions handed out during construction are [`Offset`]s measured from the
//! end of the buffer; they remain valid when the buffer grows.
//!
//! Nesting follows strict stack discipline: an object or vector must be ended
//! before another one is started, and strings/vectors must be created before
//! the object that refers to them is started. Breaking that discipline is a
//! caller bug and panics with a `precondition violation` message.

use std::marker::PhantomData;

use vtab_bytes::{ByteBuffer, Scalar, align::padding_for};

use crate::{
    FILE_IDENTIFIER_LENGTH, MAX_BUFFER_SIZE, SIZE_PREFIX, SIZE_UOFFSET, SIZE_VOFFSET,
    options::BuilderOptions,
    root::FileIdentifier,
    vtable::{VTableRegistry, encode_vtable},
};

/// Marker for an untyped table offset, as returned by [`Builder::end_object`].
pub enum Object {}

/// Position of a finished piece of data, counted from the end of the
/// builder's buffer. `T` records what the offset points to.
pub struct Offset<T: ?Sized> {
    value: u32,
    _marker: PhantomData<fn(&T)>,
}

impl<T: ?Sized> Offset<T> {
    #[inline]
    pub fn new(value: u32) -> Offset<T> {
        Offset {
            value,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Reinterprets the offset as pointing to another type.
    #[inline]
    pub fn cast<U: ?Sized>(self) -> Offset<U> {
        Offset::new(self.value)
    }
}

impl<T: ?Sized> Clone for Offset<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Offset<T> {}

impl<T: ?Sized> PartialEq for Offset<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: ?Sized> Eq for Offset<T> {}

impl<T: ?Sized> std::hash::Hash for Offset<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: ?Sized> std::fmt::Debug for Offset<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Offset({})", self.value)
    }
}

/// State of the object currently being built.
struct ObjectInProgress {
    /// Offset of each field, by slot; 0 for fields not written.
    slots: Vec<u32>,
    /// Builder offset when the object was started.
    start: u32,
}

/// Builds a buffer back-to-front.
pub struct Builder {
    buf: ByteBuffer,
    /// Start of the written data; `buf[head..]` holds everything built so far.
    head: usize,
    min_align: usize,
    object: Option<ObjectInProgress>,
    /// Element count of the vector in progress.
    vector_len: Option<usize>,
    vtables: VTableRegistry,
    options: BuilderOptions,
}

impl Builder {
    pub fn new() -> Builder {
        Self::with_options(BuilderOptions::default())
    }

    pub fn with_capacity(capacity: usize) -> Builder {
        Self::with_options(BuilderOptions::default().with_initial_capacity(capacity))
    }

    pub fn with_options(options: BuilderOptions) -> Builder {
        let capacity = options.initial_capacity.min(MAX_BUFFER_SIZE);
        Builder {
            buf: ByteBuffer::zeroed(capacity),
            head: capacity,
            min_align: 1,
            object: None,
            vector_len: None,
            vtables: VTableRegistry::new(options.dedup_vtables),
            options,
        }
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Number of bytes written so far, which is also the offset of the most
    /// recently written data.
    #[inline]
    pub fn offset(&self) -> u32 {
        (self.buf.len() - self.head) as u32
    }

    /// Number of distinct vtables written so far (only tracked with dedup on).
    pub fn num_vtables(&self) -> usize {
        self.vtables.len()
    }

    /// Begins a table with `num_fields` slots, all initially absent.
    pub fn start_object(&mut self, num_fields: usize) {
        self.assert_not_nested("start_object");
        self.object = Some(ObjectInProgress {
            slots: vec![0; num_fields],
            start: self.offset(),
        });
    }

    /// Records that the data just written is the field at `slot`.
    pub fn slot(&mut self, slot: usize) {
        let offset = self.offset();
        let Some(object) = self.object.as_mut() else {
            panic!("precondition violation: field slot {slot} written outside of an object");
        };
        assert!(
            slot < object.slots.len(),
            "precondition violation: slot {slot} is out of range for an object with {} fields",
            object.slots.len()
        );
        object.slots[slot] = offset;
    }

    /// Writes a scalar field unless it equals `default` (and defaults are not forced).
    pub fn add_slot<T: Scalar>(&mut self, slot: usize, value: T, default: T) {
        if value != default || self.options.force_defaults {
            self.prepend(value);
            self.slot(slot);
        }
    }

    /// Writes a scalar field whenever a value is present.
    pub fn add_slot_optional<T: Scalar>(&mut self, slot: usize, value: Option<T>) {
        if let Some(value) = value {
            self.prepend(value);
            self.slot(slot);
        }
    }

    /// Writes an offset field unless its raw value equals `default`.
    ///
    /// The stored value is relative to its own position in the buffer.
    pub fn prepend_uoffset_relative_slot<T: ?Sized>(
        &mut self,
        slot: usize,
        value: Offset<T>,
        default: u32,
    ) {
        if value.value() != default {
            self.prepend_uoffset_relative(value);
            self.slot(slot);
        }
    }

    /// Writes an inline struct field; `write` must prepend exactly `size` bytes.
    pub fn add_struct_slot(
        &mut self,
        slot: usize,
        align: usize,
        size: usize,
        write: impl FnOnce(&mut Builder),
    ) {
        self.prepend_struct(align, size, write);
        self.slot(slot);
    }

    /// Finishes the current table: writes its vtable (or reuses an identical
    /// one) and the table's vtable offset.
    pub fn end_object(&mut self) -> Offset<Object> {
        let Some(object) = self.object.take() else {
            panic!("precondition violation: end_object called without start_object");
        };

        self.prepend::<i32>(0);
        let object_offset = self.offset();

        let used = object
            .slots
            .iter()
            .rposition(|&offset| offset != 0)
            .map_or(0, |last| last + 1);
        let field_offsets = object.slots[..used]
            .iter()
            .map(|&offset| {
                if offset == 0 {
                    0
                } else {
                    to_u16(object_offset - offset, "field offset")
                }
            })
            .collect::<Vec<_>>();
        let table_size = to_u16(object_offset - object.start, "table size");
        let vtable = encode_vtable(&field_offsets, table_size);

        let vtable_offset = match self.vtables.lookup(&vtable) {
            Some(existing) => {
                log::trace!("reusing vtable at offset {existing} for table at {object_offset}");
                existing
            }
            None => {
                self.prep(SIZE_VOFFSET, vtable.len());
                self.head -= vtable.len();
                self.buf.as_mut_slice()[self.head..self.head + vtable.len()]
                    .copy_from_slice(&vtable);
                let offset = self.offset();
                self.vtables.register(vtable, offset);
                offset
            }
        };

        let table_pos = self.buf.len() - object_offset as usize;
        self.buf
            .put::<i32>(table_pos, vtable_offset as i32 - object_offset as i32);
        Offset::new(object_offset)
    }

    /// Reserves space for a vector of `num_elems` elements of `elem_size`
    /// bytes. The caller prepends the elements in reverse order and then calls
    /// [`Builder::end_vector`].
    pub fn start_vector(&mut self, elem_size: usize, num_elems: usize, alignment: usize) -> u32 {
        self.assert_not_nested("start_vector");
        self.vector_len = Some(num_elems);
        let data_size = elem_size * num_elems;
        self.prep(SIZE_UOFFSET, data_size);
        self.prep(alignment, data_size);
        self.offset()
    }

    /// Writes the vector length prefix and returns the vector's offset.
    pub fn end_vector<T: ?Sized>(&mut self) -> Offset<T> {
        let Some(len) = self.vector_len.take() else {
            panic!("precondition violation: end_vector called without start_vector");
        };
        self.prepend(len as u32);
        Offset::new(self.offset())
    }

    /// Writes a zero-terminated UTF-8 string.
    pub fn create_string(&mut self, s: &str) -> Offset<str> {
        self.create_byte_string(s.as_bytes(), true).cast()
    }

    /// Writes a vector of raw bytes.
    pub fn create_byte_vector(&mut self, bytes: &[u8]) -> Offset<[u8]> {
        self.create_byte_string(bytes, false).cast()
    }

    /// Writes a vector of scalars given in their natural order.
    pub fn create_vector<T: Scalar>(&mut self, items: &[T]) -> Offset<[T]> {
        self.start_vector(T::SIZE, items.len(), T::SIZE);
        for &item in items.iter().rev() {
            self.prepend(item);
        }
        self.end_vector()
    }

    /// Writes a vector of offsets (to tables or strings) given in their natural order.
    pub fn create_vector_of_offsets<T: ?Sized>(
        &mut self,
        items: &[Offset<T>],
    ) -> Offset<[Offset<T>]> {
        self.start_vector(SIZE_UOFFSET, items.len(), SIZE_UOFFSET);
        for &item in items.iter().rev() {
            self.prepend_uoffset_relative(item);
        }
        self.end_vector()
    }

    /// Writes a vector of inline structs given in their natural order; `write`
    /// must prepend exactly `size` bytes for each item.
    pub fn create_vector_of_structs<S>(
        &mut self,
        items: &[S],
        align: usize,
        size: usize,
        write: impl Fn(&mut Builder, &S),
    ) -> Offset<[S]> {
        self.start_vector(size, items.len(), align);
        for item in items.iter().rev() {
            self.prepend_struct(align, size, |builder| write(builder, item));
        }
        self.end_vector()
    }

    /// Writes the root offset (and the optional identifier) and returns the
    /// finished buffer.
    pub fn finish<T: ?Sized>(
        self,
        root: Offset<T>,
        identifier: Option<&FileIdentifier>,
    ) -> FinishedBuffer {
        self.finish_impl(root, identifier, false)
    }

    /// Like [`Builder::finish`], with a leading `u32` holding the byte length
    /// of the rest of the buffer.
    pub fn finish_size_prefixed<T: ?Sized>(
        self,
        root: Offset<T>,
        identifier: Option<&FileIdentifier>,
    ) -> FinishedBuffer {
        self.finish_impl(root, identifier, true)
    }

    fn finish_impl<T: ?Sized>(
        mut self,
        root: Offset<T>,
        identifier: Option<&FileIdentifier>,
        size_prefixed: bool,
    ) -> FinishedBuffer {
        self.assert_not_nested("finish");
        let mut prep_size = SIZE_UOFFSET;
        if identifier.is_some() {
            prep_size += FILE_IDENTIFIER_LENGTH;
        }
        if size_prefixed {
            prep_size += SIZE_PREFIX;
        }
        self.prep(self.min_align, prep_size);
        if let Some(identifier) = identifier {
            self.head -= FILE_IDENTIFIER_LENGTH;
            self.buf.as_mut_slice()[self.head..self.head + FILE_IDENTIFIER_LENGTH]
                .copy_from_slice(identifier);
        }
        self.prepend_uoffset_relative(root);
        if size_prefixed {
            let size = self.offset();
            self.prepend(size);
        }
        log::debug!(
            "finished buffer: {} bytes, {} distinct vtables, min alignment {}",
            self.offset(),
            self.vtables.len(),
            self.min_align
        );
        FinishedBuffer {
            buf: self.buf,
            head: self.head,
        }
    }

    /// Prepends a scalar, aligned to its size.
    #[inline]
    pub fn prepend<T: Scalar>(&mut self, value: T) {
        self.prep(T::SIZE, 0);
        self.head -= T::SIZE;
        self.buf.put(self.head, value);
    }

    /// Prepends an offset, converted to be relative to its own position.
    pub fn prepend_uoffset_relative<T: ?Sized>(&mut self, offset: Offset<T>) {
        self.prep(SIZE_UOFFSET, 0);
        assert!(
            offset.value() <= self.offset(),
            "precondition violation: offset {} refers to data not written yet",
            offset.value()
        );
        let relative = self.offset() - offset.value() + SIZE_UOFFSET as u32;
        self.head -= SIZE_UOFFSET;
        self.buf.put(self.head, relative);
    }

    /// Prepends an inline struct of `size` bytes aligned to `align`.
    pub fn prepend_struct(&mut self, align: usize, size: usize, write: impl FnOnce(&mut Builder)) {
        self.prep(align, size);
        let before = self.offset();
        write(self);
        assert_eq!(
            (self.offset() - before) as usize,
            size,
            "precondition violation: struct writer must prepend exactly {size} bytes"
        );
    }

    /// Prepends `n` zero bytes.
    pub fn pad(&mut self, n: usize) {
        while self.head < n {
            self.grow();
        }
        self.head -= n;
        self.buf.zero(self.head, n);
    }

    /// Aligns the write position so that after writing `additional` bytes
    /// the data is aligned to `size`, and makes room for `size` more bytes.
    pub fn prep(&mut self, size: usize, additional: usize) {
        if size > self.min_align {
            self.min_align = size;
        }
        let padding = padding_for(self.offset() as usize + additional, size);
        while self.head < padding + size + additional {
            self.grow();
        }
        self.pad(padding);
    }

    fn grow(&mut self) {
        let len = self.buf.len();
        assert!(
            len < MAX_BUFFER_SIZE,
            "cannot grow buffer beyond {MAX_BUFFER_SIZE} bytes"
        );
        let new_len = (len * 2).clamp(1, MAX_BUFFER_SIZE);
        self.buf.grow_front(new_len);
        self.head += new_len - len;
    }

    fn create_byte_string(&mut self, bytes: &[u8], zero_terminated: bool) -> Offset<()> {
        self.assert_not_nested("create_string");
        let terminator = usize::from(zero_terminated);
        self.prep(SIZE_UOFFSET, bytes.len() + terminator);
        if zero_terminated {
            self.head -= 1;
            self.buf.put(self.head, 0u8);
        }
        self.head -= bytes.len();
        self.buf.as_mut_slice()[self.head..self.head + bytes.len()].copy_from_slice(bytes);
        self.head -= SIZE_PREFIX;
        self.buf.put(self.head, bytes.len() as u32);
        Offset::new(self.offset())
    }

    fn assert_not_nested(&self, operation: &str) {
        assert!(
            self.object.is_none() && self.vector_len.is_none(),
            "precondition violation: {operation} called while an object or vector is in progress"
        );
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

fn to_u16(value: u32, what: &str) -> u16 {
    u16::try_from(value)
        .unwrap_or_else(|_| panic!("precondition violation: {what} {value} exceeds 65535 bytes"))
}

/// A completed buffer. The data occupies `full()[start()..]`; the prefix is
/// unused capacity left over from back-to-front building.
#[derive(Debug, Clone)]
pub struct FinishedBuffer {
    buf: ByteBuffer,
    head: usize,
}

impl FinishedBuffer {
    /// The finished data, starting with the root offset (or the size prefix).
    pub fn data(&self) -> &[u8] {
        &self.buf[self.head..]
    }

    /// Position of the data within [`FinishedBuffer::full`].
    pub fn start(&self) -> usize {
        self.head
    }

    /// The whole backing storage, including unused leading capacity.
    pub fn full(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub fn len(&self) -> usize {
        self.buf.len() - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<u8> {
        let mut data = self.buf.into_vec();
        data.drain(..self.head);
        data
    }
}

impl std::ops::Deref for FinishedBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.data()
    }
}

impl AsRef<[u8]> for FinishedBuffer {
    fn as_ref(&self) -> &[u8] {
        self.data()
    }
}
