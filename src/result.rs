use std::io;
use std::sync::Arc;

use thiserror::Error;

/// A unified Result type representing the outcome of method calls that may fail.
pub type IonResult<T> = Result<T, IonError>;

/// Represents the different types of high-level failures that might occur when reading or writing
/// Ion data.
///
/// The `Io` variant stores its source behind an `Arc` so that `IonError` can be `Clone`d; a writer
/// that has encountered an error retains it and returns the same error from each subsequent call.
#[derive(Debug, Error, Clone)]
pub enum IonError {
    /// Indicates that an IO error was encountered while reading or writing.
    #[error("{source:?}")]
    Io { source: Arc<io::Error> },

    /// Indicates that the input buffer did not contain enough data to perform the requested read
    /// operation.
    #[error("the input stream ended unexpectedly at offset {offset}")]
    Incomplete { offset: usize },

    /// Indicates that a type descriptor byte could not be decoded.
    #[error("encountered illegal type descriptor byte {byte:#04x} at offset {offset}")]
    InvalidTagByte { byte: u8, offset: usize },

    /// Indicates that the binary data being read is not valid Ion despite being comprised of
    /// individually legal encoding constructs.
    #[error("decoding error: {description}")]
    Decoding { description: String },

    /// Returned when the user has performed an operation that is not legal in the current state.
    /// For example: calling `step_out()` at the top level or finishing a writer while a container
    /// is still open.
    #[error("the user has performed an operation that is not legal in the current state: {operation}")]
    IllegalOperation { operation: String },
}

impl From<io::Error> for IonError {
    fn from(io_error: io::Error) -> Self {
        IonError::Io {
            source: Arc::new(io_error),
        }
    }
}

/// A convenience method for creating an `IonResult::Err(IonError::Decoding)` with the provided
/// description text.
pub(crate) fn decoding_error<T, S: Into<String>>(description: S) -> IonResult<T> {
    Err(decoding_error_raw(description))
}

/// A convenience method for creating an `IonError::Decoding` with the provided description text.
/// Useful in contexts where the only thing that can fail is the decoding itself, like `ok_or_else`.
pub(crate) fn decoding_error_raw<S: Into<String>>(description: S) -> IonError {
    IonError::Decoding {
        description: description.into(),
    }
}

/// A convenience method for creating an `IonResult::Err(IonError::Incomplete)` at the provided
/// stream offset.
pub(crate) fn incomplete_data_error<T>(offset: usize) -> IonResult<T> {
    Err(incomplete_data_error_raw(offset))
}

pub(crate) fn incomplete_data_error_raw(offset: usize) -> IonError {
    IonError::Incomplete { offset }
}

/// A convenience method for creating an `IonResult::Err(IonError::IllegalOperation)` with the
/// provided operation text.
pub(crate) fn illegal_operation<T, S: Into<String>>(operation: S) -> IonResult<T> {
    Err(illegal_operation_raw(operation))
}

pub(crate) fn illegal_operation_raw<S: Into<String>>(operation: S) -> IonError {
    IonError::IllegalOperation {
        operation: operation.into(),
    }
}

/// Constructors for `IonResult`, allowing error cases to be spelled at the result type rather than
/// through the free functions above. Both idioms appear in the codebase; the trait form reads
/// better in long method chains.
pub trait IonFailure<T> {
    fn decoding_error<S: Into<String>>(description: S) -> IonResult<T>;
    fn illegal_operation<S: Into<String>>(operation: S) -> IonResult<T>;
}

impl<T> IonFailure<T> for IonResult<T> {
    fn decoding_error<S: Into<String>>(description: S) -> IonResult<T> {
        decoding_error(description)
    }

    fn illegal_operation<S: Into<String>>(operation: S) -> IonResult<T> {
        illegal_operation(operation)
    }
}
