//! Schema descriptors: static tables mapping field slots to field kinds.
//!
//! A [`TableDescriptor`] plays the role of a generated accessor class. A
//! [`TypedTable`] pairs a raw [`Table`] view with its descriptor and checks
//! the kind of every field at the point of access, so a field declared as a
//! string cannot be read as an integer or a vector.

use ahash::AHashSet;
use serde_json::{Map, Value};
use vtab_bytes::{ReadLe, ScalarKind};
use vtab_common::{Result, error::Error, verify_data};

use crate::{
    SIZE_UOFFSET,
    options::VerifierOptions,
    root::{self, FileIdentifier},
    table::{Table, Vector},
};

/// A scalar member of an inline struct.
#[derive(Debug, Clone, Copy)]
pub struct StructField {
    pub name: &'static str,
    /// Byte offset within the struct.
    pub offset: usize,
    pub kind: ScalarKind,
}

/// Layout of a fixed-size inline struct.
#[derive(Debug, Clone, Copy)]
pub struct StructLayout {
    pub name: &'static str,
    pub size: usize,
    pub align: usize,
    pub fields: &'static [StructField],
}

/// Kind of the elements of a vector field.
#[derive(Debug, Clone, Copy)]
pub enum ElementKind {
    Scalar(ScalarKind),
    String,
    Table(&'static TableDescriptor),
    Struct(&'static StructLayout),
}

impl ElementKind {
    /// Size of one element in the vector body.
    pub fn size(&self) -> usize {
        match self {
            ElementKind::Scalar(kind) => kind.size(),
            ElementKind::String | ElementKind::Table(_) => SIZE_UOFFSET,
            ElementKind::Struct(layout) => layout.size,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ElementKind::Scalar(kind) => kind.name().to_string(),
            ElementKind::String => "string".to_string(),
            ElementKind::Table(table) => format!("table {}", table.name),
            ElementKind::Struct(layout) => format!("struct {}", layout.name),
        }
    }
}

/// Kind of a table field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Scalar(ScalarKind),
    String,
    Table(&'static TableDescriptor),
    Struct(&'static StructLayout),
    Vector(ElementKind),
}

impl FieldKind {
    pub fn describe(&self) -> String {
        match self {
            FieldKind::Scalar(kind) => kind.name().to_string(),
            FieldKind::String => "string".to_string(),
            FieldKind::Table(table) => format!("table {}", table.name),
            FieldKind::Struct(layout) => format!("struct {}", layout.name),
            FieldKind::Vector(element) => format!("vector of {}", element.describe()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub slot: usize,
    pub kind: FieldKind,
}

/// Static description of a table type.
pub struct TableDescriptor {
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
    /// Identifier written by buffers rooted at this table, if any.
    pub file_identifier: Option<FileIdentifier>,
}

impl TableDescriptor {
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_at(&self, slot: usize) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.slot == slot)
    }

    /// Number of vtable slots a writer of this table reserves.
    pub fn num_slots(&self) -> usize {
        self.fields
            .iter()
            .map(|field| field.slot + 1)
            .max()
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for TableDescriptor {
    // Field kinds can refer back to this table; print names only.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableDescriptor")
            .field("name", &self.name)
            .field(
                "fields",
                &self.fields.iter().map(|field| field.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A table view checked against its descriptor.
#[derive(Debug, Clone, Copy)]
pub struct TypedTable<'buf> {
    table: Table<'buf>,
    descriptor: &'static TableDescriptor,
}

impl<'buf> TypedTable<'buf> {
    pub fn new(table: Table<'buf>, descriptor: &'static TableDescriptor) -> TypedTable<'buf> {
        TypedTable { table, descriptor }
    }

    /// Opens the root table of `buf`, described by `descriptor`.
    pub fn from_root(
        buf: &'buf [u8],
        offset: usize,
        descriptor: &'static TableDescriptor,
        size_prefixed: bool,
    ) -> Result<TypedTable<'buf>> {
        let table = if size_prefixed {
            root::get_size_prefixed_root(buf, offset)?
        } else {
            root::get_root(buf, offset)?
        };
        Ok(TypedTable::new(table, descriptor))
    }

    /// Checks `buf` for the descriptor's file identifier; false if the
    /// descriptor declares none.
    pub fn has_identifier(
        buf: &[u8],
        offset: usize,
        descriptor: &TableDescriptor,
        size_prefixed: bool,
    ) -> bool {
        descriptor.file_identifier.is_some_and(|identifier| {
            root::buffer_has_identifier(buf, offset, &identifier, size_prefixed)
        })
    }

    pub fn table(&self) -> Table<'buf> {
        self.table
    }

    pub fn descriptor(&self) -> &'static TableDescriptor {
        self.descriptor
    }

    fn field(&self, slot: usize) -> Result<&'static FieldDescriptor> {
        self.descriptor.field_at(slot).ok_or_else(|| {
            Error::invalid_arg(
                "slot",
                format!("table {} has no field at slot {slot}", self.descriptor.name),
            )
        })
    }

    fn mismatch(&self, field: &FieldDescriptor, requested: impl Into<String>) -> Error {
        Error::field_kind_mismatch(
            self.descriptor.name,
            field.name,
            field.kind.describe(),
            requested,
        )
    }

    /// Returns `true` if the field at `slot` is written in this table.
    pub fn is_present(&self, slot: usize) -> Result<bool> {
        self.field(slot)?;
        Ok(self.table.field_offset(slot)? != 0)
    }

    pub fn get<T: vtab_bytes::Scalar>(&self, slot: usize) -> Result<Option<T>> {
        let field = self.field(slot)?;
        match field.kind {
            FieldKind::Scalar(kind) if kind == T::KIND => self.table.get_optional(slot),
            _ => Err(self.mismatch(field, T::KIND.name())),
        }
    }

    pub fn get_or<T: vtab_bytes::Scalar>(&self, slot: usize, default: T) -> Result<T> {
        Ok(self.get(slot)?.unwrap_or(default))
    }

    pub fn string(&self, slot: usize) -> Result<Option<&'buf str>> {
        let field = self.field(slot)?;
        match field.kind {
            FieldKind::String => self.table.string(slot),
            _ => Err(self.mismatch(field, "string")),
        }
    }

    pub fn table_field(&self, slot: usize) -> Result<Option<TypedTable<'buf>>> {
        let field = self.field(slot)?;
        match field.kind {
            FieldKind::Table(descriptor) => Ok(self
                .table
                .table(slot)?
                .map(|table| TypedTable::new(table, descriptor))),
            _ => Err(self.mismatch(field, "table")),
        }
    }

    pub fn struct_field(&self, slot: usize) -> Result<Option<&'buf [u8]>> {
        let field = self.field(slot)?;
        match field.kind {
            FieldKind::Struct(layout) => self.table.struct_bytes(slot, layout.size),
            _ => Err(self.mismatch(field, "struct")),
        }
    }

    pub fn vector(&self, slot: usize) -> Result<Option<TypedVector<'buf>>> {
        let field = self.field(slot)?;
        match field.kind {
            FieldKind::Vector(element) => Ok(self.table.vector(slot)?.map(|vector| TypedVector {
                vector,
                element,
                field,
                owner: self.descriptor,
            })),
            _ => Err(self.mismatch(field, "vector")),
        }
    }

    /// Checks the whole table tree against the descriptors, with the default
    /// [`VerifierOptions`].
    ///
    /// Every present field is checked once: vtables, the bounds of scalars,
    /// structs and vectors, string terminators and UTF-8. Tables reachable
    /// through several paths are verified only the first time they are seen.
    ///
    /// # Returns
    ///
    /// `Ok(())` if every reachable table, vector and string is well formed.
    ///
    /// # Errors
    ///
    /// * `OutOfRange` if any field or element lies outside of the buffer.
    /// * `MalformedVTable` if a vtable is inconsistent with its table.
    /// * `InvalidFormat` for bad strings, for nesting deeper than
    ///   `max_depth`, or when more than `max_tables` tables are reachable.
    pub fn verify(&self) -> Result<()> {
        self.verify_with_options(&VerifierOptions::default())
    }

    /// Like [`TypedTable::verify`], with explicit limits.
    pub fn verify_with_options(&self, options: &VerifierOptions) -> Result<()> {
        let mut verifier = Verifier {
            options,
            tables_left: options.max_tables,
            verified: AHashSet::new(),
        };
        verifier.table(self, 0)
    }

    /// Renders the table as JSON; absent fields are omitted.
    pub fn to_json(&self) -> Result<Value> {
        let buf = self.table.buf();
        let mut object = Map::new();
        for field in self.descriptor.fields {
            let slot = field.slot;
            let value = match field.kind {
                FieldKind::Scalar(kind) => self
                    .table
                    .field_pos(slot)?
                    .map(|pos| scalar_to_json(buf, pos, kind))
                    .transpose()?,
                FieldKind::String => self.table.string(slot)?.map(Value::from),
                FieldKind::Table(descriptor) => self
                    .table
                    .table(slot)?
                    .map(|table| TypedTable::new(table, descriptor).to_json())
                    .transpose()?,
                FieldKind::Struct(layout) => self
                    .table
                    .struct_bytes(slot, layout.size)?
                    .map(|bytes| struct_to_json(bytes, layout))
                    .transpose()?,
                FieldKind::Vector(element) => self
                    .table
                    .vector(slot)?
                    .map(|vector| vector_to_json(&vector, element))
                    .transpose()?,
            };
            if let Some(value) = value {
                object.insert(field.name.to_string(), value);
            }
        }
        Ok(Value::Object(object))
    }
}

/// A vector field checked against its element kind.
#[derive(Debug, Clone, Copy)]
pub struct TypedVector<'buf> {
    vector: Vector<'buf>,
    element: ElementKind,
    field: &'static FieldDescriptor,
    owner: &'static TableDescriptor,
}

impl<'buf> TypedVector<'buf> {
    pub fn len(&self) -> usize {
        self.vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    pub fn element_kind(&self) -> ElementKind {
        self.element
    }

    pub fn raw(&self) -> Vector<'buf> {
        self.vector
    }

    fn mismatch(&self, requested: &str) -> Error {
        Error::field_kind_mismatch(
            self.owner.name,
            self.field.name,
            self.field.kind.describe(),
            format!("vector of {requested}"),
        )
    }

    pub fn get<T: vtab_bytes::Scalar>(&self, index: usize) -> Result<T> {
        match self.element {
            ElementKind::Scalar(kind) if kind == T::KIND => self.vector.get(index),
            _ => Err(self.mismatch(T::KIND.name())),
        }
    }

    pub fn string(&self, index: usize) -> Result<&'buf str> {
        match self.element {
            ElementKind::String => self.vector.string(index),
            _ => Err(self.mismatch("string")),
        }
    }

    pub fn table(&self, index: usize) -> Result<TypedTable<'buf>> {
        match self.element {
            ElementKind::Table(descriptor) => {
                Ok(TypedTable::new(self.vector.table(index)?, descriptor))
            }
            _ => Err(self.mismatch("table")),
        }
    }

    pub fn struct_at(&self, index: usize) -> Result<&'buf [u8]> {
        match self.element {
            ElementKind::Struct(layout) => self.vector.struct_at(index, layout.size),
            _ => Err(self.mismatch("struct")),
        }
    }
}

/// Walks a table tree once, within the limits of [`VerifierOptions`].
struct Verifier<'a> {
    options: &'a VerifierOptions,
    tables_left: usize,
    /// Tables already checked, by position and descriptor.
    verified: AHashSet<(usize, usize)>,
}

impl Verifier<'_> {
    fn table(&mut self, table: &TypedTable, depth: usize) -> Result<()> {
        let descriptor = table.descriptor;
        let key = (table.table.loc(), std::ptr::from_ref(descriptor) as usize);
        if !self.verified.insert(key) {
            return Ok(());
        }
        if depth > self.options.max_depth {
            return Err(Error::invalid_format(
                descriptor.name,
                format!(
                    "tables nested deeper than {} levels",
                    self.options.max_depth
                ),
            ));
        }
        let tables_left = self.tables_left;
        verify_data!(max_tables, tables_left > 0);
        self.tables_left -= 1;

        log::trace!(
            "verifying table {} at {}",
            descriptor.name,
            table.table.loc()
        );
        let raw = table.table;
        let buf = raw.buf();
        raw.vtable()?;
        for field in descriptor.fields {
            let slot = field.slot;
            match field.kind {
                FieldKind::Scalar(kind) => {
                    if let Some(pos) = raw.field_pos(slot)? {
                        buf.bytes_at(pos, kind.size())?;
                    }
                }
                FieldKind::String => {
                    raw.string(slot)?;
                }
                FieldKind::Table(descriptor) => {
                    if let Some(child) = raw.table(slot)? {
                        self.table(&TypedTable::new(child, descriptor), depth + 1)?;
                    }
                }
                FieldKind::Struct(layout) => {
                    raw.struct_bytes(slot, layout.size)?;
                }
                FieldKind::Vector(element) => {
                    if let Some(vector) = raw.vector(slot)? {
                        self.vector(&vector, element, depth)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn vector(&mut self, vector: &Vector, element: ElementKind, depth: usize) -> Result<()> {
        vector.data(element.size())?;
        match element {
            ElementKind::String => {
                for value in vector.strings() {
                    value?;
                }
            }
            ElementKind::Table(descriptor) => {
                for child in vector.tables() {
                    self.table(&TypedTable::new(child?, descriptor), depth + 1)?;
                }
            }
            ElementKind::Scalar(_) | ElementKind::Struct(_) => {}
        }
        Ok(())
    }
}

fn vector_to_json(vector: &Vector, element: ElementKind) -> Result<Value> {
    let values = (0..vector.len())
        .map(|i| match element {
            ElementKind::Scalar(kind) => {
                scalar_to_json(vector.data(kind.size())?, i * kind.size(), kind)
            }
            ElementKind::String => Ok(Value::from(vector.string(i)?)),
            ElementKind::Table(descriptor) => {
                TypedTable::new(vector.table(i)?, descriptor).to_json()
            }
            ElementKind::Struct(layout) => struct_to_json(vector.struct_at(i, layout.size)?, layout),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Array(values))
}

fn struct_to_json(bytes: &[u8], layout: &StructLayout) -> Result<Value> {
    let mut object = Map::new();
    for field in layout.fields {
        object.insert(
            field.name.to_string(),
            scalar_to_json(bytes, field.offset, field.kind)?,
        );
    }
    Ok(Value::Object(object))
}

fn scalar_to_json(buf: &[u8], pos: usize, kind: ScalarKind) -> Result<Value> {
    Ok(match kind {
        ScalarKind::Bool => Value::from(buf.read::<bool>(pos)?),
        ScalarKind::U8 => Value::from(buf.read::<u8>(pos)?),
        ScalarKind::I8 => Value::from(buf.read::<i8>(pos)?),
        ScalarKind::U16 => Value::from(buf.read::<u16>(pos)?),
        ScalarKind::I16 => Value::from(buf.read::<i16>(pos)?),
        ScalarKind::U32 => Value::from(buf.read::<u32>(pos)?),
        ScalarKind::I32 => Value::from(buf.read::<i32>(pos)?),
        ScalarKind::U64 => Value::from(buf.read::<u64>(pos)?),
        ScalarKind::I64 => Value::from(buf.read::<i64>(pos)?),
        ScalarKind::F32 => Value::from(buf.read::<f32>(pos)?),
        ScalarKind::F64 => Value::from(buf.read::<f64>(pos)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Builder;
    use vtab_common::error::ErrorKind;

    static POINT: StructLayout = StructLayout {
        name: "Point",
        size: 8,
        align: 4,
        fields: &[
            StructField {
                name: "x",
                offset: 0,
                kind: ScalarKind::I32,
            },
            StructField {
                name: "y",
                offset: 4,
                kind: ScalarKind::I32,
            },
        ],
    };

    static SHAPE: TableDescriptor = TableDescriptor {
        name: "Shape",
        fields: &[
            FieldDescriptor {
                name: "name",
                slot: 0,
                kind: FieldKind::String,
            },
            FieldDescriptor {
                name: "sides",
                slot: 1,
                kind: FieldKind::Scalar(ScalarKind::U8),
            },
            FieldDescriptor {
                name: "origin",
                slot: 2,
                kind: FieldKind::Struct(&POINT),
            },
            FieldDescriptor {
                name: "weights",
                slot: 3,
                kind: FieldKind::Vector(ElementKind::Scalar(ScalarKind::F32)),
            },
            FieldDescriptor {
                name: "inner",
                slot: 4,
                kind: FieldKind::Table(&SHAPE),
            },
        ],
        file_identifier: Some(*b"SHAP"),
    };

    fn write_point(builder: &mut Builder, x: i32, y: i32) {
        builder.prepend(y);
        builder.prepend(x);
    }

    fn build_shapes() -> Vec<u8> {
        let mut builder = Builder::new();
        let inner_name = builder.create_string("inner");
        builder.start_object(SHAPE.num_slots());
        builder.prepend_uoffset_relative_slot(0, inner_name, 0);
        builder.add_slot::<u8>(1, 3, 0);
        let inner = builder.end_object();

        let name = builder.create_string("outer");
        let weights = builder.create_vector(&[0.5f32, 1.5]);
        builder.start_object(SHAPE.num_slots());
        builder.prepend_uoffset_relative_slot(0, name, 0);
        builder.prepend_uoffset_relative_slot(3, weights, 0);
        builder.prepend_uoffset_relative_slot(4, inner, 0);
        builder.add_struct_slot(2, 4, 8, |b| write_point(b, -1, 2));
        builder.add_slot::<u8>(1, 4, 0);
        let root = builder.end_object();
        builder.finish(root, SHAPE.file_identifier.as_ref()).into_vec()
    }

    #[test]
    fn test_descriptor_lookup() {
        assert_eq!(SHAPE.num_slots(), 5);
        assert_eq!(SHAPE.field("origin").unwrap().slot, 2);
        assert!(SHAPE.field("missing").is_none());
        assert!(SHAPE.field_at(7).is_none());
        assert!(format!("{SHAPE:?}").contains("weights"));
    }

    #[test]
    fn test_typed_access() {
        let buf = build_shapes();
        assert!(TypedTable::has_identifier(&buf, 0, &SHAPE, false));
        let shape = TypedTable::from_root(&buf, 0, &SHAPE, false).unwrap();
        shape.verify().unwrap();

        assert_eq!(shape.string(0).unwrap(), Some("outer"));
        assert_eq!(shape.get::<u8>(1).unwrap(), Some(4));
        let origin = shape.struct_field(2).unwrap().unwrap();
        assert_eq!(origin.read_i32(0).unwrap(), -1);
        assert_eq!(origin.read_i32(4).unwrap(), 2);

        let weights = shape.vector(3).unwrap().unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights.get::<f32>(1).unwrap(), 1.5);

        let inner = shape.table_field(4).unwrap().unwrap();
        assert_eq!(inner.string(0).unwrap(), Some("inner"));
        assert_eq!(inner.get_or::<u8>(1, 0).unwrap(), 3);
        assert!(!inner.is_present(2).unwrap());
        assert!(inner.vector(3).unwrap().is_none());
        assert!(inner.table_field(4).unwrap().is_none());
    }

    #[test]
    fn test_kind_mismatch() {
        let buf = build_shapes();
        let shape = TypedTable::from_root(&buf, 0, &SHAPE, false).unwrap();
        let e = shape.get::<u32>(0).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::FieldKindMismatch { field, .. } if field == "name"));
        assert!(shape.get::<u16>(1).is_err());
        assert!(shape.string(1).is_err());
        assert!(shape.vector(4).is_err());
        let weights = shape.vector(3).unwrap().unwrap();
        assert!(weights.get::<f64>(0).is_err());
        assert!(weights.string(0).is_err());

        let e = shape.get::<u8>(9).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::InvalidArgument { .. }));
    }

    #[test]
    fn test_to_json() {
        let buf = build_shapes();
        let shape = TypedTable::from_root(&buf, 0, &SHAPE, false).unwrap();
        let json = shape.to_json().unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "outer",
                "sides": 4,
                "origin": { "x": -1, "y": 2 },
                "weights": [0.5, 1.5],
                "inner": { "name": "inner", "sides": 3 },
            })
        );
    }

    #[test]
    fn test_verify_rejects_corruption() {
        let mut buf = build_shapes();
        let shape = TypedTable::from_root(&buf, 0, &SHAPE, false).unwrap();
        let name_pos = shape.table().field_pos(0).unwrap().unwrap();
        let string_pos = shape.table().indirect(name_pos).unwrap();
        // Break the string length so it runs past the end of the buffer.
        buf[string_pos..string_pos + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        let shape = TypedTable::from_root(&buf, 0, &SHAPE, false).unwrap();
        assert!(shape.verify().unwrap_err().is_out_of_range());
    }

    static NODE: TableDescriptor = TableDescriptor {
        name: "Node",
        fields: &[
            FieldDescriptor {
                name: "value",
                slot: 0,
                kind: FieldKind::Scalar(ScalarKind::U32),
            },
            FieldDescriptor {
                name: "children",
                slot: 1,
                kind: FieldKind::Vector(ElementKind::Table(&NODE)),
            },
            FieldDescriptor {
                name: "next",
                slot: 2,
                kind: FieldKind::Table(&NODE),
            },
        ],
        file_identifier: None,
    };

    /// Every level lists the level below it twice, so the number of paths
    /// from the root doubles per level while the buffer stays small.
    fn shared_child_chain(levels: usize) -> Vec<u8> {
        let mut builder = Builder::new();
        builder.start_object(NODE.num_slots());
        let mut prev = builder.end_object();
        for _ in 0..levels {
            let children = builder.create_vector_of_offsets(&[prev, prev]);
            builder.start_object(NODE.num_slots());
            builder.prepend_uoffset_relative_slot(1, children, 0);
            prev = builder.end_object();
        }
        builder.finish(prev, None).into_vec()
    }

    fn nested_chain(levels: usize) -> Vec<u8> {
        let mut builder = Builder::new();
        builder.start_object(NODE.num_slots());
        builder.add_slot::<u32>(0, 7, 0);
        let mut prev = builder.end_object();
        for _ in 0..levels {
            builder.start_object(NODE.num_slots());
            builder.prepend_uoffset_relative_slot(2, prev, 0);
            prev = builder.end_object();
        }
        builder.finish(prev, None).into_vec()
    }

    #[test]
    fn test_verify_shared_children_once() {
        let buf = shared_child_chain(40);
        assert!(buf.len() < 2048);
        let root = TypedTable::from_root(&buf, 0, &NODE, false).unwrap();
        root.verify().unwrap();

        // 40 levels plus the leaf.
        let exact = VerifierOptions::default().with_max_tables(41);
        root.verify_with_options(&exact).unwrap();
        let short = VerifierOptions::default().with_max_tables(40);
        let e = root.verify_with_options(&short).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::InvalidFormat { element, .. } if element == "max_tables"));
    }

    #[test]
    fn test_verify_depth_limit() {
        let buf = nested_chain(VerifierOptions::DEFAULT_MAX_DEPTH);
        let root = TypedTable::from_root(&buf, 0, &NODE, false).unwrap();
        root.verify().unwrap();

        let buf = nested_chain(70);
        let root = TypedTable::from_root(&buf, 0, &NODE, false).unwrap();
        let e = root.verify().unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::InvalidFormat { element, .. } if element == "Node"));
        root.verify_with_options(&VerifierOptions::default().with_max_depth(70))
            .unwrap();
    }
}
