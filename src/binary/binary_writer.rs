use std::io::Write;

use smallvec::SmallVec;

use crate::binary::raw_binary_writer::RawBinaryWriter;
use crate::constants::v1_0::system_symbol_ids;
use crate::raw_symbol_token_ref::{AsRawSymbolTokenRef, RawSymbolTokenRef};
use crate::result::{illegal_operation, IonError, IonFailure, IonResult};
use crate::symbol_table::{Import, SymbolTable};
use crate::types::{Decimal, Int, IonType, SymbolId, Timestamp};

/// Configures and constructs new instances of [BinaryWriter].
#[derive(Default)]
pub struct BinaryWriterBuilder {
    imports: Vec<Import>,
    local_symbols: Vec<String>,
}

impl BinaryWriterBuilder {
    pub fn new() -> BinaryWriterBuilder {
        BinaryWriterBuilder::default()
    }

    /// Adds a shared symbol table import. Imported tables claim SID ranges immediately
    /// after the system table, in the order they are added, and are declared in the local
    /// symbol table that prefixes the encoded datagram.
    pub fn with_import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }

    /// Pre-populates the writer's local symbol table. Useful when the application knows
    /// its symbols up front, or when a stream must match an agreed-upon symbol layout.
    pub fn with_local_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.local_symbols
            .extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn build<W: Write>(self, sink: W) -> BinaryWriter<W> {
        let mut symbol_table = SymbolTable::with_imports(self.imports);
        for text in &self.local_symbols {
            symbol_table.intern(text);
        }
        BinaryWriter {
            raw_writer: RawBinaryWriter::new(sink),
            symbol_table,
            deferred_error: None,
            finished: false,
        }
    }
}

/// A streaming binary Ion writer.
///
/// Values are buffered in memory until [BinaryWriter::finish] is called, at which point
/// the writer emits the version marker, the local symbol table describing every symbol the
/// datagram uses, and then the values themselves. Symbol tokens with text are interned
/// automatically; tokens that are already symbol IDs are validated against the table.
///
/// The first error a writer encounters is retained: every subsequent call is a no-op that
/// returns the same error. A stream whose `finish` was never reached is truncated;
/// `finish` is the writer's release path and must be invoked.
pub struct BinaryWriter<W: Write> {
    raw_writer: RawBinaryWriter<W>,
    symbol_table: SymbolTable,
    deferred_error: Option<IonError>,
    finished: bool,
}

impl<W: Write> BinaryWriter<W> {
    /// Constructs a writer with no shared table imports.
    pub fn new(sink: W) -> BinaryWriter<W> {
        BinaryWriterBuilder::new().build(sink)
    }

    /// The writer's symbol table in its current state.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    pub fn depth(&self) -> usize {
        self.raw_writer.depth()
    }

    pub fn parent_type(&self) -> Option<IonType> {
        self.raw_writer.parent_type()
    }

    pub fn write_null(&mut self, ion_type: IonType) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.write_null(ion_type);
        self.apply(result)
    }

    pub fn write_bool(&mut self, value: bool) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.write_bool(value);
        self.apply(result)
    }

    pub fn write_i64(&mut self, value: i64) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.write_i64(value);
        self.apply(result)
    }

    pub fn write_int(&mut self, value: &Int) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.write_int(value);
        self.apply(result)
    }

    pub fn write_f32(&mut self, value: f32) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.write_f32(value);
        self.apply(result)
    }

    pub fn write_f64(&mut self, value: f64) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.write_f64(value);
        self.apply(result)
    }

    pub fn write_decimal(&mut self, value: &Decimal) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.write_decimal(value);
        self.apply(result)
    }

    pub fn write_timestamp(&mut self, value: &Timestamp) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.write_timestamp(value);
        self.apply(result)
    }

    /// Writes a symbol value. Text tokens are interned into the local symbol table; symbol
    /// ID tokens must already be within the table's range.
    pub fn write_symbol<A: AsRawSymbolTokenRef>(&mut self, symbol: A) -> IonResult<()> {
        self.ready()?;
        let result = self
            .resolve_token(symbol)
            .and_then(|sid| self.raw_writer.write_symbol_id(sid));
        self.apply(result)
    }

    pub fn write_string<A: AsRef<str>>(&mut self, value: A) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.write_string(value);
        self.apply(result)
    }

    pub fn write_clob<A: AsRef<[u8]>>(&mut self, value: A) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.write_clob(value);
        self.apply(result)
    }

    pub fn write_blob<A: AsRef<[u8]>>(&mut self, value: A) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.write_blob(value);
        self.apply(result)
    }

    /// Sets the field name for the next value. Only valid inside a struct.
    pub fn set_field_name<A: AsRawSymbolTokenRef>(&mut self, name: A) -> IonResult<()> {
        self.ready()?;
        let result = self
            .resolve_token(name)
            .and_then(|sid| self.raw_writer.set_field_id(sid));
        self.apply(result)
    }

    /// Sets the annotations to attach to the next value, replacing any already pending.
    pub fn set_annotations<I, A>(&mut self, annotations: I) -> IonResult<()>
    where
        A: AsRawSymbolTokenRef,
        I: IntoIterator<Item = A>,
    {
        self.ready()?;
        let mut annotation_ids: SmallVec<[SymbolId; 2]> = SmallVec::new();
        let mut resolution: IonResult<()> = Ok(());
        for annotation in annotations {
            match self.resolve_token(annotation) {
                Ok(sid) => annotation_ids.push(sid),
                Err(error) => {
                    resolution = Err(error);
                    break;
                }
            }
        }
        let result = resolution.map(|_| self.raw_writer.set_annotation_ids(annotation_ids));
        self.apply(result)
    }

    pub fn step_in(&mut self, ion_type: IonType) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.step_in(ion_type);
        self.apply(result)
    }

    pub fn step_out(&mut self) -> IonResult<()> {
        self.ready()?;
        let result = self.raw_writer.step_out();
        self.apply(result)
    }

    /// Flushes the datagram: the binary version marker first, then the local symbol table
    /// (unless it is trivial), then every buffered value, in submission order. The writer
    /// cannot be used again afterwards.
    pub fn finish(&mut self) -> IonResult<()> {
        self.ready()?;
        let result = self.finish_datagram();
        self.finished = result.is_ok();
        self.apply(result)
    }

    fn finish_datagram(&mut self) -> IonResult<()> {
        if self.raw_writer.depth() > 0 {
            return illegal_operation("cannot finish while a container is open");
        }
        self.raw_writer.write_ion_version_marker()?;
        if self.symbol_table.has_imports() || self.symbol_table.has_local_symbols() {
            self.write_local_symbol_table()?;
        }
        self.raw_writer.flush()
    }

    /// Serializes the symbol table as an `$ion_symbol_table`-annotated struct, writing it
    /// straight to the sink ahead of the still-buffered datagram.
    fn write_local_symbol_table(&mut self) -> IonResult<()> {
        let symbol_table = &self.symbol_table;
        let mut lst_writer = RawBinaryWriter::new(self.raw_writer.output_mut());
        lst_writer.set_annotation_ids([system_symbol_ids::ION_SYMBOL_TABLE]);
        lst_writer.step_in(IonType::Struct)?;
        if symbol_table.has_imports() {
            lst_writer.set_field_id(system_symbol_ids::IMPORTS)?;
            lst_writer.step_in(IonType::List)?;
            for import in symbol_table.imports() {
                lst_writer.step_in(IonType::Struct)?;
                lst_writer.set_field_id(system_symbol_ids::NAME)?;
                lst_writer.write_string(import.name())?;
                lst_writer.set_field_id(system_symbol_ids::VERSION)?;
                lst_writer.write_i64(import.version() as i64)?;
                lst_writer.set_field_id(system_symbol_ids::MAX_ID)?;
                lst_writer.write_i64(import.max_id() as i64)?;
                lst_writer.step_out()?;
            }
            lst_writer.step_out()?;
        }
        if symbol_table.has_local_symbols() {
            lst_writer.set_field_id(system_symbol_ids::SYMBOLS)?;
            lst_writer.step_in(IonType::List)?;
            for symbol in symbol_table.local_symbols() {
                match symbol.text() {
                    Some(text) => lst_writer.write_string(text)?,
                    // A placeholder slot: it claims a SID but defines no text
                    None => lst_writer.write_null(IonType::Null)?,
                }
            }
            lst_writer.step_out()?;
        }
        lst_writer.step_out()?;
        lst_writer.flush()
    }

    // --- helpers -------------------------------------------------------------------

    fn resolve_token<A: AsRawSymbolTokenRef>(&mut self, token: A) -> IonResult<SymbolId> {
        match token.as_raw_symbol_token_ref() {
            RawSymbolTokenRef::SymbolId(sid) => {
                if !self.symbol_table.sid_is_valid(sid) {
                    return IonResult::illegal_operation(format!(
                        "symbol ID {sid} is beyond the symbol table's range (max ID {})",
                        self.symbol_table.max_id()
                    ));
                }
                Ok(sid)
            }
            RawSymbolTokenRef::Text(text) => Ok(self.symbol_table.intern(text)),
        }
    }

    fn ready(&self) -> IonResult<()> {
        if let Some(error) = &self.deferred_error {
            return Err(error.clone());
        }
        if self.finished {
            return illegal_operation("the writer has already been finished");
        }
        Ok(())
    }

    fn apply<T>(&mut self, result: IonResult<T>) -> IonResult<T> {
        if let Err(error) = &result {
            self.deferred_error = Some(error.clone());
        }
        result
    }
}
