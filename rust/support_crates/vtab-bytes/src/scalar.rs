//! Fixed-size little-endian values that can live inline in a buffer.

use byteorder::{ByteOrder, LittleEndian};

/// Tag describing the wire representation of a [`Scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ScalarKind {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ScalarKind {
    /// Size of the encoded value in bytes. Scalars are always aligned to their size.
    pub fn size(&self) -> usize {
        match self {
            ScalarKind::Bool | ScalarKind::U8 | ScalarKind::I8 => 1,
            ScalarKind::U16 | ScalarKind::I16 => 2,
            ScalarKind::U32 | ScalarKind::I32 | ScalarKind::F32 => 4,
            ScalarKind::U64 | ScalarKind::I64 | ScalarKind::F64 => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::U8 => "u8",
            ScalarKind::I8 => "i8",
            ScalarKind::U16 => "u16",
            ScalarKind::I16 => "i16",
            ScalarKind::U32 => "u32",
            ScalarKind::I32 => "i32",
            ScalarKind::U64 => "u64",
            ScalarKind::I64 => "i64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
        }
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A primitive value with a fixed little-endian encoding.
///
/// `read_le` and `write_le` receive slices of exactly `SIZE` bytes; bounds are
/// checked by the callers.
pub trait Scalar: Copy + PartialEq + std::fmt::Debug + 'static {
    const SIZE: usize;
    const KIND: ScalarKind;

    fn read_le(bytes: &[u8]) -> Self;

    fn write_le(self, bytes: &mut [u8]);
}

impl Scalar for u8 {
    const SIZE: usize = 1;
    const KIND: ScalarKind = ScalarKind::U8;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0]
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8]) {
        bytes[0] = self;
    }
}

impl Scalar for i8 {
    const SIZE: usize = 1;
    const KIND: ScalarKind = ScalarKind::I8;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8]) {
        bytes[0] = self as u8;
    }
}

impl Scalar for bool {
    const SIZE: usize = 1;
    const KIND: ScalarKind = ScalarKind::Bool;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8]) {
        bytes[0] = self as u8;
    }
}

macro_rules! impl_scalar {
    ($ty:ty, $kind:ident, $read:ident, $write:ident) => {
        impl Scalar for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();
            const KIND: ScalarKind = ScalarKind::$kind;

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                LittleEndian::$read(bytes)
            }

            #[inline]
            fn write_le(self, bytes: &mut [u8]) {
                LittleEndian::$write(bytes, self)
            }
        }
    };
}

impl_scalar!(u16, U16, read_u16, write_u16);
impl_scalar!(i16, I16, read_i16, write_i16);
impl_scalar!(u32, U32, read_u32, write_u32);
impl_scalar!(i32, I32, read_i32, write_i32);
impl_scalar!(u64, U64, read_u64, write_u64);
impl_scalar!(i64, I64, read_i64, write_i64);
impl_scalar!(f32, F32, read_f32, write_f32);
impl_scalar!(f64, F64, read_f64, write_f64);
