//! End-to-end writer scenarios with exact expected byte sequences.
//!
//! Every stream here is produced by a writer configured with one shared-table import
//! (`bogus`, version 42, max_id 100) and two pre-interned local symbols (`foo`, `bar`),
//! so each encoded datagram begins with the same version marker and local symbol table.

use std::sync::Arc;

use ion_binary::{
    BinaryWriter, BinaryWriterBuilder, Decimal, Import, IonResult, IonType, SharedSymbolTable,
};

const IVM: [u8; 4] = [0xE0, 0x01, 0x00, 0xEA];

/// The local symbol table that a writer configured with the `bogus` import and the
/// `foo`/`bar` locals must produce.
#[rustfmt::skip]
const LST_PREFIX: &[u8] = &[
    0xEE, 0x9F, 0x81, 0x83, 0xDE, 0x9B, 0x86, 0xBE, 0x8E, 0xDD,
    0x84, 0x85, b'b', b'o', b'g', b'u', b's',
    0x85, 0x21, 0x2A,
    0x88, 0x21, 0x64,
    0x87, 0xB8, 0x83, b'f', b'o', b'o', 0x83, b'b', b'a', b'r',
];

fn scenario(
    ops: impl FnOnce(&mut BinaryWriter<&mut Vec<u8>>) -> IonResult<()>,
    expected_payload: &[u8],
) {
    let bogus = SharedSymbolTable::new("bogus", 42, []).expect("table construction failed");
    let mut buffer = Vec::new();
    let mut writer = BinaryWriterBuilder::new()
        .with_import(Import::new(Arc::new(bogus), Some(100)))
        .with_local_symbols(["foo", "bar"])
        .build(&mut buffer);
    ops(&mut writer).expect("writer operations failed");
    writer.finish().expect("finish failed");

    let mut expected = IVM.to_vec();
    expected.extend_from_slice(LST_PREFIX);
    expected.extend_from_slice(expected_payload);
    assert_eq!(
        buffer, expected,
        "encoded stream did not match\n  actual: {buffer:02X?}\nexpected: {expected:02X?}"
    );
}

#[test]
fn empty_struct_and_annotated_struct_with_field_names() {
    scenario(
        |writer| {
            writer.step_in(IonType::Struct)?;
            writer.step_out()?;
            writer.set_annotations(["foo"])?;
            writer.step_in(IonType::Struct)?;
            writer.set_field_name("name")?;
            writer.set_annotations(["bar"])?;
            writer.write_null(IonType::Null)?;
            writer.set_field_name("max_id")?;
            writer.write_i64(0)?;
            writer.step_out()
        },
        &[
            0xD0, 0xEA, 0x81, 0xEE, 0xD7, 0x84, 0xE3, 0x81, 0xEF, 0x0F, 0x88, 0x20,
        ],
    );
}

#[test]
fn booleans() {
    scenario(
        |writer| {
            writer.write_bool(false)?;
            writer.write_bool(true)
        },
        &[0x10, 0x11],
    );
}

#[test]
fn annotated_bool() {
    scenario(
        |writer| {
            writer.set_annotations(["name", "version"])?;
            writer.write_bool(false)
        },
        &[0xE4, 0x82, 0x84, 0x85, 0x10],
    );
}

#[test]
fn integers() {
    scenario(
        |writer| {
            writer.write_i64(0)?;
            writer.write_i64(255)?;
            writer.write_i64(-255)?;
            writer.write_i64(65_535)?;
            writer.write_i64(-16_777_215)?;
            writer.write_i64(i64::MAX)
        },
        &[
            0x20, 0x21, 0xFF, 0x31, 0xFF, 0x22, 0xFF, 0xFF, 0x33, 0xFF, 0xFF, 0xFF, 0x28, 0x7F,
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        ],
    );
}

#[test]
fn decimals() {
    scenario(
        |writer| {
            writer.write_decimal(&Decimal::new(0u64, 0))?; // 0.
            writer.write_decimal(&Decimal::new(0u64, -1))?; // 0.0
            writer.write_decimal(&Decimal::new(1000u64, -3))?; // 1.000
            writer.write_decimal(&Decimal::new(-1i64, 100)) // -1d100
        },
        &[0x50, 0x51, 0xC1, 0x53, 0xC3, 0x03, 0xE8, 0x53, 0x00, 0xE4, 0x81],
    );
}

#[test]
fn typed_nulls_for_every_kind() {
    scenario(
        |writer| {
            for ion_type in [
                IonType::Null,
                IonType::Bool,
                IonType::Int,
                IonType::Float,
                IonType::Decimal,
                IonType::Timestamp,
                IonType::Symbol,
                IonType::String,
                IonType::Clob,
                IonType::Blob,
                IonType::List,
                IonType::SExp,
                IonType::Struct,
            ] {
                writer.write_null(ion_type)?;
            }
            Ok(())
        },
        &[
            0x0F, 0x1F, 0x2F, 0x4F, 0x5F, 0x6F, 0x7F, 0x8F, 0x9F, 0xAF, 0xBF, 0xCF, 0xDF,
        ],
    );
}

#[test]
fn annotation_symbols_resolve_through_the_import_layers() {
    // "foo" and "bar" are locals (SIDs 110 and 111, after the import's hundred slots);
    // "name" is system SID 4. All three resolve without growing the table.
    scenario(
        |writer| {
            writer.set_annotations(["bar"])?;
            writer.write_symbol("foo")
        },
        &[0xE4, 0x81, 0xEF, 0x71, 0x6E],
    );
}
