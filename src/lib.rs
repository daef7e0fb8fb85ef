//! Reader for the Aurora Lyrics Format (ALF): a small, line-oriented,
//! indentation-structured text format describing a song's metadata and lyric
//! layout.
//!
//! The crate is a two-stage pipeline: a streaming [`lexer`] turns raw bytes
//! into located items, and a [`parser`] consumes that item stream with
//! one-token lookahead to populate an [`Alf`] record.
//!
//! ## Notes
//! - Input is byte-oriented; attribute names are ASCII letters only.
//! - The lexer can run pull-driven (as an iterator) or as a producer on its
//!   own thread behind a rendezvous channel ([`lexer::Lexer::spawn`]). The
//!   item sequence is identical either way.
//!
//! ## Examples
//! ```rust
//! let source = "Title: Aurora\nNotes:\n\t- First note.\n";
//! let (record, err) = alf::decode(source.as_bytes());
//! assert!(err.is_none());
//! assert_eq!(record.title.as_deref(), Some("Aurora"));
//! assert_eq!(record.notes, vec!["First note.".to_string()]);
//! ```

pub mod diagnostics;
pub mod lexer;
pub mod parser;

pub use diagnostics::{DecodeError, LexError};
pub use parser::{Alf, Lyric, Parser, decode};
