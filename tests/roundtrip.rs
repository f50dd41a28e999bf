//! Writer-to-reader round trips: everything the writer can produce, the reader must
//! recover, including precision and sign details that naive comparisons would miss.

use std::sync::Arc;

use ion_binary::{
    BinaryWriter, BinaryWriterBuilder, Coefficient, Decimal, Import, Int, IonResult, IonType,
    MapCatalog, Reader, ReaderBuilder, SharedSymbolTable, Sign, StreamItem, Symbol, Timestamp,
};
use num_bigint::BigInt;

fn encode(ops: impl FnOnce(&mut BinaryWriter<&mut Vec<u8>>) -> IonResult<()>) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut writer = BinaryWriter::new(&mut buffer);
    ops(&mut writer).expect("writer operations failed");
    writer.finish().expect("finish failed");
    buffer
}

fn read(bytes: Vec<u8>) -> Reader<impl ion_binary::IonDataSource> {
    ReaderBuilder::new()
        .build(bytes)
        .expect("reader construction failed")
}

#[test]
fn scalars() -> IonResult<()> {
    let bytes = encode(|writer| {
        writer.write_bool(true)?;
        writer.write_i64(-42)?;
        writer.write_f64(2.5)?;
        writer.write_string("hello")?;
        writer.write_blob([0xDE, 0xAD, 0xBE, 0xEF])?;
        writer.write_clob(b"raw bytes".as_slice())
    });
    let mut reader = read(bytes);

    assert_eq!(reader.next()?, StreamItem::Value(IonType::Bool));
    assert!(reader.read_bool()?);
    assert_eq!(reader.next()?, StreamItem::Value(IonType::Int));
    assert_eq!(reader.read_i64()?, -42);
    assert_eq!(reader.next()?, StreamItem::Value(IonType::Float));
    assert_eq!(reader.read_f64()?, 2.5);
    assert_eq!(reader.next()?, StreamItem::Value(IonType::String));
    assert_eq!(reader.read_str()?, "hello");
    assert_eq!(reader.next()?, StreamItem::Value(IonType::Blob));
    assert_eq!(reader.read_blob()?, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(reader.next()?, StreamItem::Value(IonType::Clob));
    assert_eq!(reader.read_clob_bytes()?, b"raw bytes");
    assert_eq!(reader.next()?, StreamItem::Nothing);
    Ok(())
}

#[test]
fn typed_nulls() -> IonResult<()> {
    let all_types = [
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
    ];
    let bytes = encode(|writer| {
        for ion_type in all_types {
            writer.write_null(ion_type)?;
        }
        Ok(())
    });
    let mut reader = read(bytes);
    for ion_type in all_types {
        assert_eq!(reader.next()?, StreamItem::Null(ion_type));
        assert_eq!(reader.read_null()?, ion_type);
    }
    assert_eq!(reader.next()?, StreamItem::Nothing);
    Ok(())
}

#[test]
fn large_and_small_integers() -> IonResult<()> {
    let big: BigInt = BigInt::from(2u8).pow(200) - 1;
    let negative_big = -big.clone();
    let bytes = encode(|writer| {
        writer.write_i64(0)?;
        writer.write_i64(i64::MIN)?;
        writer.write_i64(i64::MAX)?;
        writer.write_int(&Int::from(big.clone()))?;
        writer.write_int(&Int::from(negative_big.clone()))
    });
    let mut reader = read(bytes);
    reader.next()?;
    assert_eq!(reader.read_i64()?, 0);
    reader.next()?;
    assert_eq!(reader.read_i64()?, i64::MIN);
    reader.next()?;
    assert_eq!(reader.read_i64()?, i64::MAX);
    reader.next()?;
    assert_eq!(reader.read_int()?, Int::from(big));
    reader.next()?;
    assert_eq!(reader.read_int()?, Int::from(negative_big));
    Ok(())
}

#[test]
fn floats_preserve_bit_patterns() -> IonResult<()> {
    let values = [0.0f64, -0.0, 1.5, -123.25, f64::INFINITY, f64::NEG_INFINITY, f64::NAN];
    let bytes = encode(|writer| {
        for value in values {
            writer.write_f64(value)?;
        }
        Ok(())
    });
    let mut reader = read(bytes);
    for value in values {
        reader.next()?;
        let read_back = reader.read_f64()?;
        assert_eq!(
            read_back.to_bits(),
            value.to_bits(),
            "bit pattern mismatch for {value}"
        );
    }
    Ok(())
}

#[test]
fn decimals_preserve_precision_and_sign() -> IonResult<()> {
    let decimals = [
        Decimal::new(0u64, 0),
        Decimal::new(0u64, -3),         // 0.000
        Decimal::negative_zero(),       // -0.
        Decimal::negative_zero_with_exponent(-2),
        Decimal::new(1000u64, -3),      // 1.000: trailing zeros survive
        Decimal::new(1i64, 0),          // 1: distinct from 1.000
        Decimal::new(-7i64, 30),
        Decimal::new(
            Coefficient::new(Sign::Positive, 123_456_789_012_345_678u64),
            -18,
        ),
    ];
    let bytes = encode(|writer| {
        for decimal in &decimals {
            writer.write_decimal(decimal)?;
        }
        Ok(())
    });
    let mut reader = read(bytes);
    for decimal in &decimals {
        reader.next()?;
        assert_eq!(&reader.read_decimal()?, decimal);
    }
    Ok(())
}

#[test]
fn big_decimal_coefficients() -> IonResult<()> {
    let coefficient = BigInt::from(2u8).pow(130);
    let decimal = Decimal::new(Coefficient::from(coefficient), -50);
    let bytes = encode(|writer| writer.write_decimal(&decimal));
    let mut reader = read(bytes);
    reader.next()?;
    assert_eq!(reader.read_decimal()?, decimal);
    Ok(())
}

#[test]
fn timestamps_at_every_precision() -> IonResult<()> {
    let timestamps = [
        Timestamp::with_year(2021).build()?,
        Timestamp::with_year(2021).with_month(12).build()?,
        Timestamp::with_ymd(2021, 12, 25).build()?,
        Timestamp::with_ymd(2021, 12, 25)
            .with_hour_and_minute(23, 59)
            .build()?,
        Timestamp::with_ymd(2021, 12, 25)
            .with_hour_and_minute(23, 59)
            .with_offset(0)
            .build()?,
        Timestamp::with_ymd(2021, 12, 25)
            .with_hour_and_minute(23, 59)
            .with_second(59)
            .with_offset(-480)
            .build()?,
        Timestamp::with_ymd(2021, 12, 25)
            .with_hour_and_minute(23, 59)
            .with_second(59)
            .with_milliseconds(250)
            .with_offset(330)
            .build()?,
        Timestamp::with_ymd(2021, 12, 25)
            .with_hour_and_minute(23, 59)
            .with_second(59)
            .with_nanoseconds(123_456_789)
            .build()?,
    ];
    let bytes = encode(|writer| {
        for timestamp in &timestamps {
            writer.write_timestamp(timestamp)?;
        }
        Ok(())
    });
    let mut reader = read(bytes);
    for timestamp in &timestamps {
        reader.next()?;
        assert_eq!(&reader.read_timestamp()?, timestamp);
    }
    Ok(())
}

#[test]
fn timestamp_offsets_cross_midnight() -> IonResult<()> {
    // 00:30+01:00 is 23:30 UTC on the previous day; the round trip must restore the
    // local date.
    let timestamp = Timestamp::with_ymd(2021, 3, 1)
        .with_hour_and_minute(0, 30)
        .with_offset(60)
        .build()?;
    let bytes = encode(|writer| writer.write_timestamp(&timestamp));
    let mut reader = read(bytes);
    reader.next()?;
    let read_back = reader.read_timestamp()?;
    assert_eq!(read_back, timestamp);
    assert_eq!(read_back.day(), 1);
    assert_eq!(read_back.hour(), 0);
    Ok(())
}

#[test]
fn timestamp_fraction_with_trailing_zeros() -> IonResult<()> {
    let timestamp = Timestamp::with_ymd(2021, 1, 1)
        .with_hour_and_minute(0, 0)
        .with_second(0)
        .with_fractional_seconds(Decimal::new(500u64, -4)) // 0.0500
        .with_offset(0)
        .build()?;
    let bytes = encode(|writer| writer.write_timestamp(&timestamp));
    let mut reader = read(bytes);
    reader.next()?;
    let read_back = reader.read_timestamp()?;
    assert_eq!(read_back.fractional_seconds(), Some(Decimal::new(500u64, -4)));
    assert_eq!(read_back, timestamp);
    Ok(())
}

#[test]
fn nested_containers() -> IonResult<()> {
    let bytes = encode(|writer| {
        writer.step_in(IonType::List)?;
        writer.write_i64(1)?;
        writer.step_in(IonType::SExp)?;
        writer.write_string("nested")?;
        writer.step_in(IonType::List)?;
        writer.step_out()?;
        writer.step_out()?;
        writer.step_in(IonType::Struct)?;
        writer.set_field_name("deep")?;
        writer.write_bool(true)?;
        writer.step_out()?;
        writer.step_out()
    });
    let mut reader = read(bytes);
    assert_eq!(reader.next()?, StreamItem::Value(IonType::List));
    reader.step_in()?;
    assert_eq!(reader.next()?, StreamItem::Value(IonType::Int));
    assert_eq!(reader.read_i64()?, 1);
    assert_eq!(reader.next()?, StreamItem::Value(IonType::SExp));
    reader.step_in()?;
    assert_eq!(reader.next()?, StreamItem::Value(IonType::String));
    assert_eq!(reader.read_str()?, "nested");
    assert_eq!(reader.next()?, StreamItem::Value(IonType::List));
    reader.step_in()?;
    assert_eq!(reader.next()?, StreamItem::Nothing);
    reader.step_out()?;
    assert_eq!(reader.next()?, StreamItem::Nothing);
    reader.step_out()?;
    assert_eq!(reader.next()?, StreamItem::Value(IonType::Struct));
    reader.step_in()?;
    assert_eq!(reader.next()?, StreamItem::Value(IonType::Bool));
    assert_eq!(reader.field_name()?.text(), Some("deep"));
    assert!(reader.read_bool()?);
    reader.step_out()?;
    assert_eq!(reader.next()?, StreamItem::Nothing);
    reader.step_out()?;
    assert_eq!(reader.next()?, StreamItem::Nothing);
    Ok(())
}

#[test]
fn long_values_use_var_uint_lengths() -> IonResult<()> {
    let long_text = "a".repeat(500);
    let long_blob = vec![0xABu8; 300];
    let bytes = encode(|writer| {
        writer.write_string(&long_text)?;
        writer.write_blob(&long_blob)?;
        writer.step_in(IonType::List)?;
        for _ in 0..100 {
            writer.write_i64(7)?;
        }
        writer.step_out()
    });
    let mut reader = read(bytes);
    reader.next()?;
    assert_eq!(reader.read_str()?, long_text);
    reader.next()?;
    assert_eq!(reader.read_blob()?, long_blob);
    reader.next()?;
    reader.step_in()?;
    let mut count = 0;
    while reader.next()? != StreamItem::Nothing {
        assert_eq!(reader.read_i64()?, 7);
        count += 1;
    }
    assert_eq!(count, 100);
    reader.step_out()?;
    Ok(())
}

#[test]
fn annotations_on_values_and_containers() -> IonResult<()> {
    let bytes = encode(|writer| {
        writer.set_annotations(["alpha", "beta"])?;
        writer.write_i64(9)?;
        writer.set_annotations(["outer"])?;
        writer.step_in(IonType::List)?;
        writer.set_annotations(["inner"])?;
        writer.write_bool(false)?;
        writer.step_out()
    });
    let mut reader = read(bytes);
    reader.next()?;
    let annotations: IonResult<Vec<Symbol>> = reader.annotations().collect();
    let annotations = annotations?;
    assert_eq!(annotations[0].text(), Some("alpha"));
    assert_eq!(annotations[1].text(), Some("beta"));
    assert_eq!(reader.read_i64()?, 9);

    reader.next()?;
    let annotations: IonResult<Vec<Symbol>> = reader.annotations().collect();
    assert_eq!(annotations?[0].text(), Some("outer"));
    reader.step_in()?;
    reader.next()?;
    let annotations: IonResult<Vec<Symbol>> = reader.annotations().collect();
    assert_eq!(annotations?[0].text(), Some("inner"));
    assert!(!reader.read_bool()?);
    reader.step_out()?;
    Ok(())
}

#[test]
fn repeated_field_names_are_preserved() -> IonResult<()> {
    let bytes = encode(|writer| {
        writer.step_in(IonType::Struct)?;
        writer.set_field_name("x")?;
        writer.write_i64(1)?;
        writer.set_field_name("x")?;
        writer.write_i64(2)?;
        writer.step_out()
    });
    let mut reader = read(bytes);
    reader.next()?;
    reader.step_in()?;
    reader.next()?;
    assert_eq!(reader.field_name()?.text(), Some("x"));
    assert_eq!(reader.read_i64()?, 1);
    reader.next()?;
    assert_eq!(reader.field_name()?.text(), Some("x"));
    assert_eq!(reader.read_i64()?, 2);
    assert_eq!(reader.next()?, StreamItem::Nothing);
    Ok(())
}

#[test]
fn symbols_survive_multiple_tables() -> IonResult<()> {
    let shared = SharedSymbolTable::new(
        "colors",
        2,
        [Symbol::owned("red"), Symbol::owned("green"), Symbol::owned("blue")],
    )?;

    let mut buffer = Vec::new();
    let mut writer = BinaryWriterBuilder::new()
        .with_import(Import::new(Arc::new(shared.clone()), None))
        .build(&mut buffer);
    writer.write_symbol("green")?; // resolves through the import
    writer.write_symbol("cyan")?; // interned locally
    writer.finish()?;

    let mut catalog = MapCatalog::new();
    catalog.insert_table(shared);
    let mut reader = ReaderBuilder::new().with_catalog(catalog).build(buffer)?;
    reader.next()?;
    assert_eq!(reader.read_symbol()?.text(), Some("green"));
    reader.next()?;
    assert_eq!(reader.read_symbol()?.text(), Some("cyan"));
    Ok(())
}

#[test]
fn truncated_imports_limit_the_sid_range() -> IonResult<()> {
    let shared = SharedSymbolTable::new(
        "colors",
        1,
        [Symbol::owned("red"), Symbol::owned("green"), Symbol::owned("blue")],
    )?;

    let mut buffer = Vec::new();
    let mut writer = BinaryWriterBuilder::new()
        .with_import(Import::new(Arc::new(shared.clone()), Some(2)))
        .build(&mut buffer);
    // SID 11 is "green", the import's final slot under max_id 2
    writer.write_symbol(11usize)?;
    writer.finish()?;

    let mut catalog = MapCatalog::new();
    catalog.insert_table(shared);
    let mut reader = ReaderBuilder::new().with_catalog(catalog).build(buffer)?;
    reader.next()?;
    assert_eq!(reader.read_symbol()?.text(), Some("green"));
    // "blue" was truncated away; its SID is out of range
    assert!(reader.symbol_table().text_for(12).is_none());
    Ok(())
}

#[test]
fn catalog_version_fallback_pads_missing_symbols() -> IonResult<()> {
    // The writer encodes against version 2 of a table...
    let v2 = SharedSymbolTable::new("colors", 2, [Symbol::owned("red"), Symbol::owned("green")])?;
    let mut buffer = Vec::new();
    let mut writer = BinaryWriterBuilder::new()
        .with_import(Import::new(Arc::new(v2), None))
        .build(&mut buffer);
    writer.write_symbol("green")?;
    writer.finish()?;

    // ...but the reader's catalog only has version 1, which happens to agree on slot 1
    let v1 = SharedSymbolTable::new("colors", 1, [Symbol::owned("red"), Symbol::owned("green")])?;
    let mut catalog = MapCatalog::new();
    catalog.insert_table(v1);
    let mut reader = ReaderBuilder::new().with_catalog(catalog).build(buffer)?;
    reader.next()?;
    assert_eq!(reader.read_symbol()?.text(), Some("green"));
    Ok(())
}

#[test]
fn empty_datagram_round_trips() -> IonResult<()> {
    let bytes = encode(|_writer| Ok(()));
    let mut reader = read(bytes);
    assert_eq!(reader.next()?, StreamItem::Nothing);
    Ok(())
}

#[test]
fn container_framing_is_exact() -> IonResult<()> {
    // After stepping into any container and exhausting it, the next item is Nothing and
    // stepping out lands exactly on the following value.
    let bytes = encode(|writer| {
        writer.step_in(IonType::List)?;
        writer.write_string("first")?;
        writer.write_string("second")?;
        writer.step_out()?;
        writer.write_i64(99)
    });
    let mut reader = read(bytes);
    reader.next()?;
    reader.step_in()?;
    assert_eq!(reader.next()?, StreamItem::Value(IonType::String));
    assert_eq!(reader.next()?, StreamItem::Value(IonType::String));
    assert_eq!(reader.read_str()?, "second");
    assert_eq!(reader.next()?, StreamItem::Nothing);
    assert_eq!(reader.next()?, StreamItem::Nothing);
    reader.step_out()?;
    assert_eq!(reader.next()?, StreamItem::Value(IonType::Int));
    assert_eq!(reader.read_i64()?, 99);
    Ok(())
}

#[test]
fn owned_tokens_drive_the_writer_like_text() -> IonResult<()> {
    let annotation = ion_binary::RawSymbolToken::from("loud");
    let value = ion_binary::RawSymbolToken::from("duck");
    let bytes = encode(|writer| {
        writer.set_annotations([&annotation])?;
        writer.write_symbol(&value)
    });
    let mut reader = read(bytes);
    reader.next()?;
    let annotations: IonResult<Vec<Symbol>> = reader.annotations().collect();
    assert_eq!(annotations?[0].text(), Some("loud"));
    assert_eq!(reader.read_symbol()?.text(), Some("duck"));
    Ok(())
}

#[test]
fn unknown_text_symbols_write_as_sid_zero() -> IonResult<()> {
    let bytes = encode(|writer| writer.write_symbol(Symbol::unknown_text()));
    let mut reader = read(bytes);
    reader.next()?;
    assert_eq!(reader.read_symbol()?.text(), None);
    Ok(())
}
