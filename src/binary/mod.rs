//! The binary encoding layer: tag bytes, variable-length integer primitives, and the
//! streaming reader and writer built on top of them.

pub mod binary_writer;
pub(crate) mod constants;
pub mod decimal;
pub mod int;
pub mod raw_binary_reader;
pub mod raw_binary_writer;
pub mod timestamp;
pub mod type_code;
pub mod uint;
pub mod var_int;
pub mod var_uint;

pub use binary_writer::{BinaryWriter, BinaryWriterBuilder};
pub use raw_binary_reader::RawBinaryReader;
pub use raw_binary_writer::RawBinaryWriter;
pub use type_code::IonTypeCode;
