//! Error types for the ALF reader.
//!
//! The lexer latches the first failure it hits and emits a terminal `Error`
//! item; the decoder propagates that error through its own return, and adds
//! its one domain error (an attribute name outside the recognized set).

use miette::Diagnostic;
use thiserror::Error;

/// Failure raised while tokenizing ALF source.
///
/// Retrievable from the lexer (or its handle, in producer/consumer mode)
/// after an `Error` item has been observed.
#[derive(Debug, Error, Diagnostic)]
pub enum LexError {
    /// The underlying byte source failed to read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A byte that matches none of the lexer's routing cases.
    #[error("unexpected byte 0x{byte:02x} at {line}:{col}")]
    UnexpectedByte {
        byte: u8,
        /// Zero-based line of the offending byte.
        line: usize,
        /// Zero-based column of the offending byte.
        col: usize,
    },
}

/// Failure raised while decoding an item stream into an [`crate::Alf`] record.
#[derive(Debug, Error, Diagnostic)]
pub enum DecodeError {
    /// The lexer terminated with an `Error` item.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A top-level attribute name outside the recognized set.
    #[error("unknown attribute name {name:?} at {line}:{col}")]
    UnknownAttribute {
        name: String,
        line: usize,
        col: usize,
    },
}
