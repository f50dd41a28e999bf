use std::fmt::{Display, Formatter};
use std::io::{Chain, Cursor, Read};
use std::sync::Arc;

use delegate::delegate;

use crate::binary::constants::v1_0::IVM;
use crate::binary::raw_binary_reader::RawBinaryReader;
use crate::catalog::{Catalog, MapCatalog};
use crate::constants::v1_0::system_symbol_ids;
use crate::data_source::{IonDataSource, ToIonDataSource};
use crate::raw_reader::RawStreamItem;
use crate::result::{decoding_error, decoding_error_raw, IonResult};
use crate::shared_symbol_table::SharedSymbolTable;
use crate::symbol::Symbol;
use crate::symbol_table::{Import, SymbolTable};
use crate::types::{Decimal, Int, IonType, SymbolId, Timestamp};

/// Configures and constructs new instances of [Reader].
pub struct ReaderBuilder {
    catalog: Box<dyn Catalog>,
}

impl ReaderBuilder {
    /// Constructs a [ReaderBuilder] with an empty catalog.
    pub fn new() -> ReaderBuilder {
        ReaderBuilder {
            catalog: Box::new(MapCatalog::new()),
        }
    }

    /// Supplies the catalog the reader will use to resolve shared symbol table imports.
    pub fn with_catalog<C: Catalog + 'static>(mut self, catalog: C) -> Self {
        self.catalog = Box::new(catalog);
        self
    }

    /// Applies the configured settings to a new [Reader] over `input`. The first four
    /// bytes of input are inspected to confirm that it is binary Ion; empty input is
    /// accepted and yields an empty stream.
    pub fn build<I: ToIonDataSource>(
        self,
        input: I,
    ) -> IonResult<Reader<Chain<Cursor<Vec<u8>>, I::DataSource>>> {
        let mut input = input.to_ion_data_source();
        let mut header: [u8; 4] = [0u8; 4];

        // Read up to four bytes. This is done manually because `read_exact` errors on
        // streams shorter than the buffer, and the empty stream is legal.
        let mut total_bytes_read = 0usize;
        while total_bytes_read < IVM.len() {
            let bytes_read = input.read(&mut header[total_bytes_read..])?;
            if bytes_read == 0 {
                break;
            }
            total_bytes_read += bytes_read;
        }

        match &header[..total_bytes_read] {
            [] => {}
            [0xE0, 0x01, 0x00, 0xEA] => {}
            [0xE0, major, minor, 0xEA] => {
                return decoding_error(format!(
                    "cannot read Ion v{major}.{minor}; only v1.0 is supported"
                ));
            }
            _ => {
                return decoding_error(
                    "input does not begin with a binary Ion version marker",
                );
            }
        }

        // Stitch the header bytes back onto the front of the stream
        let full_input = Cursor::new(header[..total_bytes_read].to_vec()).chain(input);
        Ok(Reader {
            raw_reader: RawBinaryReader::new(full_input),
            symbol_table: SymbolTable::new(),
            catalog: self.catalog,
        })
    }
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        ReaderBuilder::new()
    }
}

/// Stream components that a [Reader] may encounter.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum StreamItem {
    /// A non-null Ion value and its corresponding Ion data type.
    Value(IonType),
    /// A null Ion value and its corresponding Ion data type.
    Null(IonType),
    /// Indicates that the reader is not positioned over anything: the stream (or the
    /// container being traversed) has no further values.
    Nothing,
}

impl Display for StreamItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use StreamItem::*;
        match self {
            Value(ion_type) => write!(f, "{ion_type}"),
            Null(ion_type) => write!(f, "null.{ion_type}"),
            Nothing => write!(f, "nothing/end-of-sequence"),
        }
    }
}

/// A streaming binary Ion reader that resolves symbol IDs into their corresponding text.
///
/// System-level constructs never surface: version markers reset the symbol table, and
/// top-level structs annotated with `$ion_symbol_table` are applied as local symbol
/// tables (resolving their imports through the configured [Catalog]) and then skipped.
pub struct Reader<R: IonDataSource> {
    raw_reader: RawBinaryReader<R>,
    symbol_table: SymbolTable,
    catalog: Box<dyn Catalog>,
}

impl<R: IonDataSource> Reader<R> {
    /// Advances the cursor to the next application-level value at the current depth.
    pub fn next(&mut self) -> IonResult<StreamItem> {
        loop {
            match self.raw_reader.next()? {
                RawStreamItem::VersionMarker(_, _) => {
                    // A new segment begins with a fresh symbol table
                    self.symbol_table = SymbolTable::new();
                }
                RawStreamItem::Value(IonType::Struct)
                    if self.raw_reader.depth() == 0
                        && self.raw_reader.annotations().first()
                            == Some(&system_symbol_ids::ION_SYMBOL_TABLE) =>
                {
                    self.apply_local_symbol_table()?;
                }
                RawStreamItem::Value(ion_type) => return Ok(StreamItem::Value(ion_type)),
                RawStreamItem::Null(ion_type) => return Ok(StreamItem::Null(ion_type)),
                RawStreamItem::Nothing => return Ok(StreamItem::Nothing),
            }
        }
    }

    /// The reader's symbol table in its current state.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    /// If the current value is a field within a struct, returns the resolved field name.
    pub fn field_name(&self) -> IonResult<Symbol> {
        let field_id = self
            .raw_reader
            .field_id()
            .ok_or_else(|| decoding_error_raw("the current value is not a struct field"))?;
        self.resolve(field_id)
    }

    /// The annotations on the current value, in order, resolved against the symbol table.
    pub fn annotations(&self) -> impl Iterator<Item = IonResult<Symbol>> + '_ {
        self.raw_reader
            .annotations()
            .iter()
            .map(move |sid| self.resolve(*sid))
    }

    pub fn has_annotations(&self) -> bool {
        self.raw_reader.has_annotations()
    }

    /// Reads the current symbol value and resolves it.
    pub fn read_symbol(&mut self) -> IonResult<Symbol> {
        let sid = self.raw_reader.read_symbol_id()?;
        self.resolve(sid)
    }

    delegate! {
        to self.raw_reader {
            pub fn ion_version(&self) -> (u8, u8);
            pub fn ion_type(&self) -> Option<IonType>;
            pub fn is_null(&self) -> bool;
            pub fn depth(&self) -> usize;
            pub fn parent_type(&self) -> Option<IonType>;
            pub fn step_in(&mut self) -> IonResult<()>;
            pub fn step_out(&mut self) -> IonResult<()>;
            pub fn read_null(&mut self) -> IonResult<IonType>;
            pub fn read_bool(&mut self) -> IonResult<bool>;
            pub fn read_i64(&mut self) -> IonResult<i64>;
            pub fn read_int(&mut self) -> IonResult<Int>;
            pub fn read_f32(&mut self) -> IonResult<f32>;
            pub fn read_f64(&mut self) -> IonResult<f64>;
            pub fn read_decimal(&mut self) -> IonResult<Decimal>;
            pub fn read_timestamp(&mut self) -> IonResult<Timestamp>;
            pub fn read_str(&mut self) -> IonResult<&str>;
            pub fn read_string(&mut self) -> IonResult<String>;
            pub fn read_blob_bytes(&mut self) -> IonResult<&[u8]>;
            pub fn read_blob(&mut self) -> IonResult<Vec<u8>>;
            pub fn read_clob_bytes(&mut self) -> IonResult<&[u8]>;
            pub fn read_clob(&mut self) -> IonResult<Vec<u8>>;
        }
    }

    fn resolve(&self, sid: SymbolId) -> IonResult<Symbol> {
        self.symbol_table.symbol_for(sid).cloned().ok_or_else(|| {
            decoding_error_raw(format!(
                "symbol ID {sid} is beyond the symbol table's range (max ID {})",
                self.symbol_table.max_id()
            ))
        })
    }

    /// Consumes the `$ion_symbol_table`-annotated struct the cursor is positioned on and
    /// installs the table it describes.
    fn apply_local_symbol_table(&mut self) -> IonResult<()> {
        self.raw_reader.step_in()?;

        let mut imports: Vec<Import> = Vec::new();
        let mut local_symbols: Vec<Symbol> = Vec::new();

        loop {
            let item = self.raw_reader.next()?;
            let ion_type = match item {
                RawStreamItem::Nothing => break,
                RawStreamItem::Null(_) => continue,
                RawStreamItem::Value(ion_type) => ion_type,
                RawStreamItem::VersionMarker(major, minor) => {
                    return decoding_error(format!(
                        "found an Ion v{major}.{minor} version marker inside a symbol table"
                    ));
                }
            };
            let field_id = self.raw_reader.field_id().ok_or_else(|| {
                decoding_error_raw("found a symbol table field with no field name")
            })?;
            match (field_id, ion_type) {
                (system_symbol_ids::IMPORTS, IonType::List) => {
                    imports = self.read_import_descriptors()?;
                }
                (system_symbol_ids::IMPORTS, IonType::Symbol) => {
                    // `imports: $ion_symbol_table` requests append mode
                    let sid = self.raw_reader.read_symbol_id()?;
                    if sid == system_symbol_ids::ION_SYMBOL_TABLE {
                        return decoding_error(
                            "local symbol table append mode is not supported",
                        );
                    }
                }
                (system_symbol_ids::SYMBOLS, IonType::List) => {
                    local_symbols = self.read_declared_symbols()?;
                }
                // Any other field (or a misshapen known field) carries no meaning here
                _ => {}
            }
        }
        self.raw_reader.step_out()?;

        let mut symbol_table = SymbolTable::with_imports(imports);
        for symbol in local_symbols {
            symbol_table.append_symbol(symbol);
        }
        self.symbol_table = symbol_table;
        Ok(())
    }

    /// Reads the `imports` field's list of `{name, version, max_id}` descriptors,
    /// resolving each against the catalog.
    fn read_import_descriptors(&mut self) -> IonResult<Vec<Import>> {
        let mut imports = Vec::new();
        self.raw_reader.step_in()?;
        loop {
            match self.raw_reader.next()? {
                RawStreamItem::Nothing => break,
                RawStreamItem::Value(IonType::Struct) => {
                    if let Some(import) = self.read_import_descriptor()? {
                        imports.push(import);
                    }
                }
                // Non-struct entries in an import list carry no meaning
                _ => {}
            }
        }
        self.raw_reader.step_out()?;
        Ok(imports)
    }

    fn read_import_descriptor(&mut self) -> IonResult<Option<Import>> {
        let mut name: Option<String> = None;
        let mut version: Option<i64> = None;
        let mut max_id: Option<i64> = None;

        self.raw_reader.step_in()?;
        loop {
            let ion_type = match self.raw_reader.next()? {
                RawStreamItem::Nothing => break,
                RawStreamItem::Value(ion_type) => ion_type,
                _ => continue,
            };
            let field_id = match self.raw_reader.field_id() {
                Some(field_id) => field_id,
                None => continue,
            };
            match (field_id, ion_type) {
                (system_symbol_ids::NAME, IonType::String) => {
                    name = Some(self.raw_reader.read_string()?);
                }
                (system_symbol_ids::VERSION, IonType::Int) => {
                    version = Some(self.raw_reader.read_i64()?);
                }
                (system_symbol_ids::MAX_ID, IonType::Int) => {
                    max_id = Some(self.raw_reader.read_i64()?);
                }
                _ => {}
            }
        }
        self.raw_reader.step_out()?;

        // An import with no usable name is ignored, as is an explicit reference to the
        // system table; the system symbols are always present.
        let name = match name {
            Some(name) if !name.is_empty() && name != "$ion" => name,
            _ => return Ok(None),
        };
        let version = version.filter(|version| *version >= 1).unwrap_or(1) as u32;
        let max_id = match max_id {
            Some(max_id) if max_id < 0 => {
                return decoding_error(format!(
                    "import '{name}' declares a negative max_id ({max_id})"
                ));
            }
            Some(max_id) => Some(max_id as usize),
            None => None,
        };

        if let Some(table) = self.catalog.table(&name, version) {
            return Ok(Some(Import::new(table, max_id)));
        }
        // No exact match; a declared max_id lets the reader assign the SID range anyway
        let max_id = match max_id {
            Some(max_id) => max_id,
            None => {
                return decoding_error(format!(
                    "import '{name}' version {version} is not in the catalog and declares no max_id"
                ));
            }
        };
        let table = match self.catalog.latest_table(&name) {
            Some(table) => table,
            // A placeholder with no symbols: every slot has unknown text
            None => Arc::new(SharedSymbolTable::new(name, version, [])?),
        };
        Ok(Some(Import::new(table, Some(max_id))))
    }

    /// Reads the `symbols` field's list. Non-string entries claim SID slots with
    /// unknown text.
    fn read_declared_symbols(&mut self) -> IonResult<Vec<Symbol>> {
        let mut symbols = Vec::new();
        self.raw_reader.step_in()?;
        loop {
            match self.raw_reader.next()? {
                RawStreamItem::Nothing => break,
                RawStreamItem::Value(IonType::String) => {
                    symbols.push(Symbol::owned(self.raw_reader.read_str()?));
                }
                _ => symbols.push(Symbol::unknown_text()),
            }
        }
        self.raw_reader.step_out()?;
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::binary_writer::{BinaryWriter, BinaryWriterBuilder};

    fn reader_over(bytes: Vec<u8>) -> Reader<impl IonDataSource> {
        ReaderBuilder::new()
            .build(bytes)
            .expect("failed to construct a reader")
    }

    #[test]
    fn empty_input_is_an_empty_stream() -> IonResult<()> {
        let mut reader = reader_over(Vec::new());
        assert_eq!(reader.next()?, StreamItem::Nothing);
        Ok(())
    }

    #[test]
    fn text_input_is_rejected() {
        assert!(ReaderBuilder::new().build(&b"{hello: 1}"[..]).is_err());
    }

    #[test]
    fn future_versions_are_rejected() {
        assert!(ReaderBuilder::new()
            .build(&[0xE0u8, 0x02, 0x00, 0xEA][..])
            .is_err());
    }

    #[test]
    fn symbol_tables_are_consumed_transparently() -> IonResult<()> {
        let mut encoded = Vec::new();
        let mut writer = BinaryWriter::new(&mut encoded);
        writer.write_symbol("waffle")?;
        writer.finish()?;

        let mut reader = reader_over(encoded);
        // The first application-level item is the symbol value, not the LST struct
        assert_eq!(reader.next()?, StreamItem::Value(IonType::Symbol));
        assert_eq!(reader.read_symbol()?.text(), Some("waffle"));
        assert_eq!(reader.next()?, StreamItem::Nothing);
        Ok(())
    }

    #[test]
    fn field_names_and_annotations_resolve() -> IonResult<()> {
        let mut encoded = Vec::new();
        let mut writer = BinaryWriter::new(&mut encoded);
        writer.step_in(IonType::Struct)?;
        writer.set_field_name("kind")?;
        writer.set_annotations(["loud"])?;
        writer.write_string("quack")?;
        writer.step_out()?;
        writer.finish()?;

        let mut reader = reader_over(encoded);
        assert_eq!(reader.next()?, StreamItem::Value(IonType::Struct));
        reader.step_in()?;
        assert_eq!(reader.next()?, StreamItem::Value(IonType::String));
        assert_eq!(reader.field_name()?.text(), Some("kind"));
        let annotations: IonResult<Vec<Symbol>> = reader.annotations().collect();
        assert_eq!(annotations?[0].text(), Some("loud"));
        assert_eq!(reader.read_str()?, "quack");
        Ok(())
    }

    #[test]
    fn imports_resolve_through_the_catalog() -> IonResult<()> {
        let shared = SharedSymbolTable::new(
            "menagerie",
            1,
            [Symbol::owned("cat"), Symbol::owned("dog")],
        )?;

        let mut encoded = Vec::new();
        let writer_import = Import::new(Arc::new(shared.clone()), None);
        let mut writer = BinaryWriterBuilder::new()
            .with_import(writer_import)
            .build(&mut encoded);
        writer.write_symbol("dog")?;
        writer.finish()?;

        let mut catalog = MapCatalog::new();
        catalog.insert_table(shared);
        let mut reader = ReaderBuilder::new().with_catalog(catalog).build(encoded)?;
        assert_eq!(reader.next()?, StreamItem::Value(IonType::Symbol));
        assert_eq!(reader.read_symbol()?.text(), Some("dog"));
        Ok(())
    }

    #[test]
    fn unresolvable_imports_pad_with_unknown_text() -> IonResult<()> {
        let placeholder = SharedSymbolTable::new("mystery", 7, [])?;
        let mut encoded = Vec::new();
        let mut writer = BinaryWriterBuilder::new()
            .with_import(Import::new(Arc::new(placeholder), Some(3)))
            .build(&mut encoded);
        // SID 10 is the first slot of the unresolvable import
        writer.write_symbol(10usize)?;
        writer.finish()?;

        // The reader has no catalog entry for "mystery"; the declared max_id still
        // reserves the SID range
        let mut reader = reader_over(encoded);
        assert_eq!(reader.next()?, StreamItem::Value(IonType::Symbol));
        let symbol = reader.read_symbol()?;
        assert_eq!(symbol.text(), None);
        Ok(())
    }

    #[test]
    fn out_of_range_sids_are_decoding_errors() -> IonResult<()> {
        // A symbol value with SID 99 and no symbol table
        let mut reader = reader_over(vec![0xE0, 0x01, 0x00, 0xEA, 0x71, 0x63]);
        assert_eq!(reader.next()?, StreamItem::Value(IonType::Symbol));
        assert!(reader.read_symbol().is_err());
        Ok(())
    }

    #[test]
    fn a_version_marker_resets_the_symbol_table() -> IonResult<()> {
        let mut encoded = Vec::new();
        let mut writer = BinaryWriter::new(&mut encoded);
        writer.write_symbol("ephemeral")?;
        writer.finish()?;
        // A second segment: a fresh IVM followed by a symbol value using SID 10
        encoded.extend_from_slice(&[0xE0, 0x01, 0x00, 0xEA, 0x71, 0x0A]);

        let mut reader = reader_over(encoded);
        assert_eq!(reader.next()?, StreamItem::Value(IonType::Symbol));
        assert_eq!(reader.read_symbol()?.text(), Some("ephemeral"));
        // After the second IVM, SID 10 is no longer defined
        assert_eq!(reader.next()?, StreamItem::Value(IonType::Symbol));
        assert!(reader.read_symbol().is_err());
        Ok(())
    }

    #[test]
    fn append_mode_is_rejected() {
        // {imports: $ion_symbol_table} annotated with $ion_symbol_table
        let bytes = vec![
            0xE0, 0x01, 0x00, 0xEA, // IVM
            0xE6, 0x81, 0x83, // annotation wrapper, SID 3
            0xD3, 0x86, 0x71, 0x03, // {imports: $3}
        ];
        let mut reader = reader_over(bytes);
        assert!(reader.next().is_err());
    }
}
