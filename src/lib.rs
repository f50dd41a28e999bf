//! # ion-binary
//!
//! A streaming reader and writer for the [Amazon Ion](https://amazon-ion.github.io/ion-docs/)
//! 1.0 binary format.
//!
//! The crate is layered:
//!
//! * [binary::RawBinaryReader] and [binary::RawBinaryWriter] speak the wire format
//!   directly; symbols are numeric IDs at this level.
//! * [Reader] and [binary::BinaryWriter] add the symbol-table machinery: the writer
//!   interns text and prefixes its output with a local symbol table, while the reader
//!   applies the symbol tables it encounters (resolving shared-table imports through a
//!   [Catalog]) and surfaces fully resolved [Symbol]s.
//!
//! Writers buffer their output in memory, because container lengths precede container
//! bodies on the wire and nothing can be emitted until the lengths are known. The whole
//! datagram is flushed when [binary::BinaryWriter::finish] is called.
//!
//! ```
//! use ion_binary::{BinaryWriter, IonType, ReaderBuilder, StreamItem};
//!
//! fn main() -> ion_binary::IonResult<()> {
//!     let mut encoded = Vec::new();
//!     let mut writer = BinaryWriter::new(&mut encoded);
//!     writer.step_in(IonType::Struct)?;
//!     writer.set_field_name("greeting")?;
//!     writer.write_string("hello")?;
//!     writer.step_out()?;
//!     writer.finish()?;
//!
//!     let mut reader = ReaderBuilder::new().build(encoded)?;
//!     assert_eq!(reader.next()?, StreamItem::Value(IonType::Struct));
//!     reader.step_in()?;
//!     reader.next()?;
//!     assert_eq!(reader.field_name()?.text(), Some("greeting"));
//!     assert_eq!(reader.read_str()?, "hello");
//!     Ok(())
//! }
//! ```

pub mod binary;
pub mod catalog;
pub(crate) mod constants;
pub mod data_source;
pub mod raw_reader;
pub mod raw_symbol_token;
pub mod raw_symbol_token_ref;
pub mod reader;
pub mod result;
pub mod shared_symbol_table;
pub mod symbol;
pub mod symbol_table;
pub mod types;

pub use binary::binary_writer::{BinaryWriter, BinaryWriterBuilder};
pub use binary::raw_binary_reader::RawBinaryReader;
pub use binary::raw_binary_writer::RawBinaryWriter;
pub use catalog::{Catalog, MapCatalog};
pub use data_source::{IonDataSource, ToIonDataSource};
pub use raw_reader::RawStreamItem;
pub use raw_symbol_token::RawSymbolToken;
pub use raw_symbol_token_ref::{AsRawSymbolTokenRef, RawSymbolTokenRef};
pub use reader::{Reader, ReaderBuilder, StreamItem};
pub use result::{IonError, IonFailure, IonResult};
pub use shared_symbol_table::SharedSymbolTable;
pub use symbol::Symbol;
pub use symbol_table::{Import, SymbolTable};
pub use types::value_ref::RawValueRef;
pub use types::{Coefficient, Decimal, Int, IonType, Mantissa, Precision, Sign, SymbolId, Timestamp, UInt};
