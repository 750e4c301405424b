use vtab_common::error::ErrorKind;

use crate::{
    Builder, BuilderOptions, Offset, Table, VerifierOptions, checksum,
    defs::op_info::{
        ArgType, ArgTypeAndIndex, KernelTypeStrArgsEntry, KernelTypeStrArgsEntryRef,
        OpIdKernelTypeStrArgsEntry, OpInfo, OpInfoRef, ORT_FILE_IDENTIFIER,
    },
    get_root,
};

const OP_IDS: [&str; 3] = [":Add:14", "com.microsoft:FusedConv:1", ":Cast:13"];

/// Builds an `OpInfo` with the raw write helpers. The entry for `Cast` never
/// starts its kernel type string vector.
fn build_with_helpers(builder: &mut Builder) -> Offset<OpInfo> {
    let t = builder.create_string("T");
    KernelTypeStrArgsEntry::start_args_vector(builder, 2);
    // Elements go in back to front.
    for arg in [
        ArgTypeAndIndex::new(ArgType::Output, 0),
        ArgTypeAndIndex::new(ArgType::Input, 1),
    ] {
        builder.prepend_struct(ArgTypeAndIndex::ALIGNMENT, ArgTypeAndIndex::SIZE, |b| {
            arg.write(b)
        });
    }
    let args = builder.end_vector::<[ArgTypeAndIndex]>();
    KernelTypeStrArgsEntry::start(builder);
    KernelTypeStrArgsEntry::add_kernel_type_str(builder, t);
    KernelTypeStrArgsEntry::add_args(builder, args);
    let kernel_entry = KernelTypeStrArgsEntry::end(builder);

    let mut entries = Vec::new();
    for (i, op_id) in OP_IDS.iter().enumerate() {
        let kernel_entries = (i < 2).then(|| builder.create_vector_of_offsets(&[kernel_entry]));
        let op_id = builder.create_string(op_id);
        OpIdKernelTypeStrArgsEntry::start(builder);
        OpIdKernelTypeStrArgsEntry::add_op_id(builder, op_id);
        if let Some(kernel_entries) = kernel_entries {
            OpIdKernelTypeStrArgsEntry::add_kernel_type_str_args(builder, kernel_entries);
        }
        entries.push(OpIdKernelTypeStrArgsEntry::end(builder));
    }

    OpInfo::start_op_kernel_type_str_args_vector(builder, entries.len());
    for &entry in entries.iter().rev() {
        builder.prepend_uoffset_relative(entry);
    }
    let entries = builder.end_vector();

    OpInfo::start(builder);
    OpInfo::add_op_kernel_type_str_args(builder, entries);
    OpInfo::end(builder)
}

#[test]
fn test_op_info_scenario() {
    let mut builder = Builder::new();
    let root = build_with_helpers(&mut builder);
    let buf = builder.finish(root, Some(&ORT_FILE_IDENTIFIER));

    assert!(OpInfoRef::buffer_has_identifier(&buf, 0, false));
    let info = OpInfoRef::from_root(&buf, 0).unwrap();
    info.verify().unwrap();

    assert!(!info.op_kernel_type_str_args_is_none().unwrap());
    assert_eq!(info.op_kernel_type_str_args_len().unwrap(), 3);
    for (j, op_id) in OP_IDS.iter().enumerate() {
        let entry = info.op_kernel_type_str_args(j).unwrap().unwrap();
        assert_eq!(entry.op_id().unwrap(), Some(*op_id));
    }

    let cast = info.op_kernel_type_str_args(2).unwrap().unwrap();
    assert!(cast.kernel_type_str_args_is_none().unwrap());
    assert_eq!(cast.kernel_type_str_args_len().unwrap(), 0);

    let add = info.find(":Add:14").unwrap().unwrap();
    let t = add.kernel_type_str_args(0).unwrap().unwrap();
    assert_eq!(t.kernel_type_str().unwrap(), Some("T"));
    assert_eq!(t.args_len().unwrap(), 2);
    assert_eq!(
        t.args(0).unwrap(),
        Some(ArgTypeAndIndex::new(ArgType::Input, 1))
    );
    assert_eq!(
        t.args(1).unwrap(),
        Some(ArgTypeAndIndex::new(ArgType::Output, 0))
    );

    let owned = OpInfo::from_bytes(&buf).unwrap();
    assert_eq!(
        owned.args_for("com.microsoft:FusedConv:1", "T").unwrap().len(),
        2
    );
    assert!(owned.args_for(":Cast:13", "T").is_none());
}

#[test]
fn test_shared_child_written_once() {
    let mut builder = Builder::new();
    let root = build_with_helpers(&mut builder);
    let buf = builder.finish(root, None);
    let info = OpInfoRef::from_root(&buf, 0).unwrap();
    let first = info.op_kernel_type_str_args(0).unwrap().unwrap();
    let second = info.op_kernel_type_str_args(1).unwrap().unwrap();
    assert_eq!(
        first.kernel_type_str_args(0).unwrap().unwrap().as_typed().table().loc(),
        second.kernel_type_str_args(0).unwrap().unwrap().as_typed().table().loc()
    );
}

#[test]
fn test_verify_counts_shared_child_once() {
    let mut builder = Builder::new();
    let root = build_with_helpers(&mut builder);
    let buf = builder.finish(root, Some(&ORT_FILE_IDENTIFIER));

    // The root, three operator entries and one kernel entry shared by two of them.
    let exact = VerifierOptions::default().with_max_tables(5);
    assert!(OpInfo::from_bytes_with_options(&buf, false, &exact).is_ok());
    let short = VerifierOptions::default().with_max_tables(4);
    let e = OpInfo::from_bytes_with_options(&buf, false, &short).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::InvalidFormat { .. }));
}

fn two_tables(options: BuilderOptions) -> (Vec<u8>, usize) {
    let mut builder = Builder::with_options(options);
    let a = builder.create_string("a");
    builder.start_object(2);
    builder.prepend_uoffset_relative_slot(0, a, 0);
    builder.add_slot::<u32>(1, 10, 0);
    let first = builder.end_object();
    let b = builder.create_string("b");
    builder.start_object(2);
    builder.prepend_uoffset_relative_slot(0, b, 0);
    builder.add_slot::<u32>(1, 20, 0);
    let second = builder.end_object();
    let vtables = builder.num_vtables();
    let list = builder.create_vector_of_offsets(&[first, second]);
    (builder.finish(list, None).into_vec(), vtables)
}

#[test]
fn test_vtable_dedup() {
    let (buf, vtables) = two_tables(BuilderOptions::default());
    assert_eq!(vtables, 1);
    let list = crate::Vector::at(&buf, crate::table::indirect(&buf, 0).unwrap()).unwrap();
    let first = list.table(0).unwrap();
    let second = list.table(1).unwrap();
    assert_eq!(
        first.vtable().unwrap().pos(),
        second.vtable().unwrap().pos()
    );
    assert_eq!(first.get::<u32>(1, 0).unwrap(), 10);
    assert_eq!(second.get::<u32>(1, 0).unwrap(), 20);
    assert_eq!(second.string(0).unwrap(), Some("b"));

    let (plain, _) = two_tables(BuilderOptions::default().with_dedup_vtables(false));
    assert!(plain.len() > buf.len());
    let list = crate::Vector::at(&plain, crate::table::indirect(&plain, 0).unwrap()).unwrap();
    assert_ne!(
        list.table(0).unwrap().vtable().unwrap().pos(),
        list.table(1).unwrap().vtable().unwrap().pos()
    );
}

#[test]
fn test_different_presence_gets_own_vtable() {
    let mut builder = Builder::new();
    builder.start_object(2);
    builder.add_slot::<u16>(0, 1, 0);
    let first = builder.end_object();
    builder.start_object(2);
    builder.add_slot::<u16>(1, 1, 0);
    let second = builder.end_object();
    assert_eq!(builder.num_vtables(), 2);
    let list = builder.create_vector_of_offsets(&[first, second]);
    let buf = builder.finish(list, None);
    let list = crate::Vector::at(&buf, crate::table::indirect(&buf, 0).unwrap()).unwrap();
    let first = list.table(0).unwrap();
    let second = list.table(1).unwrap();
    assert_ne!(first.vtable().unwrap().pos(), second.vtable().unwrap().pos());
    assert_eq!(first.vtable().unwrap().num_slots(), 1);
    assert_eq!(second.vtable().unwrap().num_slots(), 2);
    assert_eq!(first.field_offset(1).unwrap(), 0);
}

#[test]
fn test_old_writer_reads_as_absent() {
    // A writer that only knew `kernel_type_str`.
    let mut builder = Builder::new();
    let t = builder.create_string("T");
    builder.start_object(1);
    builder.prepend_uoffset_relative_slot(0, t, 0);
    let root = builder.end_object();
    let buf = builder.finish(root, None);

    let table = get_root(&buf, 0).unwrap();
    assert_eq!(table.vtable().unwrap().num_slots(), 1);
    assert_eq!(table.field_offset(1).unwrap(), 0);
    assert_eq!(table.field_offset(100).unwrap(), 0);

    let entry = KernelTypeStrArgsEntryRef::new(table);
    assert_eq!(entry.kernel_type_str().unwrap(), Some("T"));
    assert!(entry.args_is_none().unwrap());
    assert_eq!(entry.args_len().unwrap(), 0);
    assert!(entry.args(0).unwrap().is_none());
}

#[test]
fn test_scalar_round_trip() {
    let mut builder = Builder::new();
    builder.start_object(6);
    builder.add_slot::<bool>(0, true, false);
    builder.add_slot::<i64>(1, -5_000_000_000, 0);
    builder.add_slot::<f64>(2, 2.5, 0.0);
    builder.add_slot::<i8>(3, -3, 0);
    builder.add_slot::<u16>(4, 0, 0);
    builder.add_slot_optional::<f32>(5, Some(0.0));
    let root = builder.end_object();
    let buf = builder.finish(root, None);

    let table = get_root(&buf, 0).unwrap();
    assert!(table.get::<bool>(0, false).unwrap());
    assert_eq!(table.get::<i64>(1, 0).unwrap(), -5_000_000_000);
    assert_eq!(table.get::<f64>(2, 0.0).unwrap(), 2.5);
    assert_eq!(table.get::<i8>(3, 0).unwrap(), -3);
    assert_eq!(table.get_optional::<u16>(4).unwrap(), None);
    assert_eq!(table.get::<u16>(4, 9).unwrap(), 9);
    assert_eq!(table.get_optional::<f32>(5).unwrap(), Some(0.0));
}

#[test]
fn test_byte_vector_and_strings_round_trip() {
    let mut builder = Builder::with_capacity(16);
    let bytes = builder.create_byte_vector(&[1, 2, 3, 4, 5]);
    let empty = builder.create_string("");
    let unicode = builder.create_string("κόσμε");
    let names = builder.create_vector_of_offsets(&[empty, unicode]);
    builder.start_object(2);
    builder.prepend_uoffset_relative_slot(0, bytes, 0);
    builder.prepend_uoffset_relative_slot(1, names, 0);
    let root = builder.end_object();
    let buf = builder.finish(root, None);

    let table = get_root(&buf, 0).unwrap();
    assert_eq!(table.byte_vector(0).unwrap(), Some(&[1u8, 2, 3, 4, 5][..]));
    let names = table.vector(1).unwrap().unwrap();
    assert_eq!(
        names.strings().collect::<vtab_common::Result<Vec<_>>>().unwrap(),
        vec!["", "κόσμε"]
    );
}

#[test]
fn test_malformed_vtable_is_reported_on_access() {
    let mut builder = Builder::new();
    builder.start_object(1);
    builder.add_slot::<u32>(0, 7, 0);
    let root = builder.end_object();
    let mut buf = builder.finish(root, None).into_vec();

    let table = get_root(&buf, 0).unwrap();
    let loc = table.loc();
    let vtable_pos = table.vtable().unwrap().pos();
    // Shrink the declared table size below the field's offset.
    buf[vtable_pos + 2..vtable_pos + 4].copy_from_slice(&4u16.to_le_bytes());

    let table = Table::new(&buf, loc);
    let e = table.get::<u32>(0, 0).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::MalformedVTable { .. }));
}

#[test]
fn test_truncated_buffer_is_out_of_range() {
    let buf = OpInfo {
        op_kernel_type_str_args: Some(vec![OpIdKernelTypeStrArgsEntry {
            op_id: Some(":Relu:14".to_string()),
            kernel_type_str_args: None,
        }]),
    }
    .to_bytes()
    .into_vec();
    for len in [0, 3, 8, buf.len() / 2, buf.len() - 4] {
        assert!(OpInfo::from_bytes(&buf[..len]).is_err(), "len {len}");
    }
    assert!(OpInfo::from_bytes(&buf).is_ok());
}

#[test]
fn test_identifier_check() {
    let buf = OpInfo::default().to_bytes();
    assert!(crate::buffer_has_identifier(&buf, 0, b"ORTM", false));
    assert!(!crate::buffer_has_identifier(&buf, 0, b"ORTN", false));
    assert!(!OpInfoRef::buffer_has_identifier(&buf[..6], 0, false));

    let mut builder = Builder::new();
    builder.start_object(0);
    let root = builder.end_object();
    let anonymous = builder.finish(root, None);
    assert!(!OpInfoRef::buffer_has_identifier(&anonymous, 0, false));
}

#[test]
fn test_sealed_size_prefixed_round_trip() {
    let info = OpInfo {
        op_kernel_type_str_args: Some(vec![OpIdKernelTypeStrArgsEntry {
            op_id: Some(":Where:16".to_string()),
            kernel_type_str_args: Some(vec![KernelTypeStrArgsEntry {
                kernel_type_str: Some("T".to_string()),
                args: Some(vec![
                    ArgTypeAndIndex::new(ArgType::Input, 1),
                    ArgTypeAndIndex::new(ArgType::Input, 2),
                    ArgTypeAndIndex::new(ArgType::Output, 0),
                ]),
            }]),
        }]),
    };
    let buf = info.finish(Builder::new(), true);
    let message = checksum::seal(&buf);
    let payload = checksum::open(&message).unwrap();
    assert_eq!(payload, buf.data());
    assert_eq!(OpInfo::from_size_prefixed_bytes(payload).unwrap(), info);
}

#[test]
fn test_to_json() {
    let info = OpInfo {
        op_kernel_type_str_args: Some(vec![OpIdKernelTypeStrArgsEntry {
            op_id: Some(":Add:14".to_string()),
            kernel_type_str_args: Some(vec![KernelTypeStrArgsEntry {
                kernel_type_str: Some("T".to_string()),
                args: Some(vec![ArgTypeAndIndex::new(ArgType::Output, 0)]),
            }]),
        }]),
    };
    let buf = info.to_bytes();
    let json = OpInfoRef::from_root(&buf, 0).unwrap().to_json().unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "op_kernel_type_str_args": [{
                "op_id": ":Add:14",
                "kernel_type_str_args": [{
                    "kernel_type_str": "T",
                    "args": [{ "arg_type": 1, "index": 0 }],
                }],
            }],
        })
    );
}
