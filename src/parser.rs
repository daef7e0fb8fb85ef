//! Decoder for Aurora Lyrics Format (ALF) source.
//!
//! Wraps a byte source, lexes it into located items, and populates an
//! [`Alf`] record by dispatching on attribute names with one item of
//! lookahead. Comments and stray layout items are skipped; list and nested
//! blocks are scoped by the indent width of their first body line.
//!
//! ## Examples
//! ```rust
//! use alf::Parser;
//!
//! let source = "Title: The title.\nArtist: Gopher.";
//! let (record, err) = Parser::new(source.as_bytes()).decode();
//! assert!(err.is_none());
//! assert_eq!(record.title.as_deref(), Some("The title."));
//! assert_eq!(record.artist.as_deref(), Some("Gopher."));
//! ```

use std::io::Read;

use crate::diagnostics::DecodeError;
use crate::lexer::{Item, Lexer, Token};

// ============================================================================
// RECORD TYPES
// ============================================================================

/// A decoded ALF record.
///
/// Every field is optional; attributes missing from the source are left at
/// their defaults. The recognized top-level attribute names are `Title`,
/// `Author`, `Artist`, `Album`, `Names`, `Notes`, and `Lyric`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alf {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Alternate names for the song, in source order.
    pub names: Vec<String>,
    pub artist: Option<String>,
    pub album: Option<String>,

    pub lyric: Lyric,

    /// Performance notes, in source order.
    pub notes: Vec<String>,
}

/// The nested `Lyric` block of an ALF record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lyric {
    /// Lyric ordering, from the nested `Order` list.
    pub order: Vec<String>,
}

// ============================================================================
// PARSER
// ============================================================================

/// Single-shot decoder from a byte source to an [`Alf`] record.
///
/// Construction instantiates the lexer; [`Parser::decode`] drains the item
/// stream. The lexer is consumed pull-driven here; its item sequence is
/// identical to the producer/consumer form.
pub struct Parser<R: Read> {
    lexer: Lexer<R>,
    /// One-item lookahead slot, empty when `None`.
    peek_slot: Option<Item>,
    /// First error latched during decoding.
    error: Option<DecodeError>,
}

impl<R: Read> Parser<R> {
    /// Create a new decoder over the given byte source.
    pub fn new(source: R) -> Self {
        Self {
            lexer: Lexer::new(source),
            peek_slot: None,
            error: None,
        }
    }

    /// Decode the source, returning the record built so far together with
    /// the first error encountered, if any.
    pub fn decode(mut self) -> (Alf, Option<DecodeError>) {
        let record = self.parse();
        (record, self.error)
    }

    fn parse(&mut self) -> Alf {
        let mut alf = Alf::default();

        loop {
            let item = self.next_item();
            match item.token {
                Token::Name => match item.literal.as_str() {
                    "Title" => alf.title = self.parse_text(),
                    "Author" => alf.author = self.parse_text(),
                    "Artist" => alf.artist = self.parse_text(),
                    "Album" => alf.album = self.parse_text(),
                    "Names" => alf.names = self.parse_list(0),
                    "Notes" => alf.notes = self.parse_list(0),
                    "Lyric" => alf.lyric = self.parse_lyric(),
                    _ => {
                        self.error = Some(DecodeError::UnknownAttribute {
                            name: item.literal,
                            line: item.line,
                            col: item.col,
                        });
                        return alf;
                    }
                },
                Token::Eof => return alf,
                // The lexer's error was latched when the item was pulled.
                Token::Error => return alf,
                // Comments and stray layout items are skipped at top level.
                _ => {}
            }
        }
    }

    /// Scalar attribute value: one `Colon`, one `Whitespace`, one `Text`.
    fn parse_text(&mut self) -> Option<String> {
        self.next_item();
        self.next_item();

        let item = self.next_item();
        (item.token == Token::Text).then_some(item.literal)
    }

    /// List attribute body, scoped to lines indented at least `indent` bytes.
    ///
    /// The block ends at end of input, at the first line whose indent width
    /// is strictly smaller, or at the first non-list item.
    fn parse_list(&mut self, indent: usize) -> Vec<String> {
        let mut list = Vec::new();

        // Consume colon.
        self.next_item();

        loop {
            if self.peek_token() == Token::Eof {
                return list;
            }

            let item = self.next_item();

            if item.token == Token::Newline {
                if self.parse_indent() < indent {
                    return list;
                }
                continue;
            }

            if item.token != Token::List {
                return list;
            }

            // Consume the whitespace separating the marker from the value.
            self.next_item();

            let text = self.next_item();
            if text.token == Token::Text {
                list.push(text.literal);
            }
        }
    }

    /// Nested `Lyric` block. The block's indent is fixed by its first body
    /// line; a line indented strictly less ends it. `Order` is the only
    /// recognized nested attribute, anything else is skipped.
    fn parse_lyric(&mut self) -> Lyric {
        let mut lyric = Lyric::default();

        // Consume colon.
        self.next_item();

        if self.peek_token() == Token::Newline {
            self.next_item();
        }
        let indent = self.parse_indent();

        loop {
            if self.peek_token() == Token::Eof {
                return lyric;
            }

            let item = self.next_item();

            if item.token == Token::Newline && self.parse_indent() < indent {
                return lyric;
            }

            if item.token == Token::Name && item.literal == "Order" {
                lyric.order = self.parse_list(indent);
            }
        }
    }

    /// Width in bytes of the indent at the current position, consuming it.
    /// Zero when the next item is not an `Indent`; tabs and spaces both
    /// count as one unit.
    fn parse_indent(&mut self) -> usize {
        if self.peek_token() != Token::Indent {
            return 0;
        }
        self.next_item().literal.len()
    }

    // ========================================================================
    // One-item lookahead
    // ========================================================================

    /// Pull a fresh item from the lexer, latching its error on the terminal
    /// `Error` item. An exhausted stream yields synthesized `Eof` items so
    /// the parsing loops unwind without a sentinel value.
    fn pull(&mut self) -> Item {
        match self.lexer.next() {
            Some(item) => {
                if item.token == Token::Error && self.error.is_none() {
                    self.error = self.lexer.take_error().map(DecodeError::from);
                }
                item
            }
            None => Item::new(Token::Eof, "", 0, 0),
        }
    }

    /// Consume the lookahead slot if filled, else pull fresh.
    fn next_item(&mut self) -> Item {
        match self.peek_slot.take() {
            Some(item) => item,
            None => self.pull(),
        }
    }

    /// Token kind of the next item, filling the lookahead slot if empty.
    fn peek_token(&mut self) -> Token {
        if self.peek_slot.is_none() {
            let item = self.pull();
            self.peek_slot = Some(item);
        }
        self.peek_slot.as_ref().map_or(Token::Eof, |item| item.token)
    }
}

/// Decode ALF source into an [`Alf`] record.
///
/// This is a shorthand for `Parser::new(source).decode()`.
#[tracing::instrument(skip_all)]
pub fn decode<R: Read>(source: R) -> (Alf, Option<DecodeError>) {
    Parser::new(source).decode()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::LexError;
    use std::io;

    /// Decode a source string, asserting no error is reported.
    fn decode_str(source: &str) -> Alf {
        let (record, err) = decode(source.as_bytes());
        assert!(err.is_none(), "unexpected decode error: {err:?}");
        record
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode_str(""), Alf::default());
    }

    #[test]
    fn test_comment_only() {
        assert_eq!(decode_str("# A comment."), Alf::default());
    }

    #[test]
    fn test_scalar_attributes() {
        assert_eq!(decode_str("Title: Other Test.").title.as_deref(), Some("Other Test."));
        assert_eq!(decode_str("Author: The author...").author.as_deref(), Some("The author..."));
        assert_eq!(decode_str("Artist: Other Artist.").artist.as_deref(), Some("Other Artist."));
        assert_eq!(decode_str("Album: An album.").album.as_deref(), Some("An album."));
    }

    #[test]
    fn test_attribute_with_comment() {
        let record = decode_str("# Test.\nTitle: Test");
        assert_eq!(record.title.as_deref(), Some("Test"));
    }

    #[test]
    fn test_multiple_scalar_attributes() {
        let record = decode_str("Title: The title.\nArtist: Gopher.");
        assert_eq!(
            record,
            Alf {
                title: Some("The title.".into()),
                artist: Some("Gopher.".into()),
                ..Alf::default()
            }
        );
    }

    #[test]
    fn test_empty_scalar_value() {
        // "Title: " with nothing after the separating space decodes to an
        // empty, but present, value.
        let record = decode_str("Title: \n");
        assert_eq!(record.title.as_deref(), Some(""));
    }

    #[test]
    fn test_names_list() {
        let record = decode_str("Names:\n\t- Test");
        assert_eq!(record.names, vec!["Test".to_string()]);
    }

    #[test]
    fn test_notes_list() {
        let record = decode_str("Notes:\n\t- A note.");
        assert_eq!(record.notes, vec!["A note.".to_string()]);
    }

    #[test]
    fn test_multiple_list_items() {
        let record = decode_str("Notes:\n\t- Note one.\n\t- Note two.");
        assert_eq!(record.notes, vec!["Note one.".to_string(), "Note two.".to_string()]);
    }

    #[test]
    fn test_list_with_space_indent() {
        let record = decode_str("Names:\n  - Spaced");
        assert_eq!(record.names, vec!["Spaced".to_string()]);
    }

    #[test]
    fn test_lyric_order() {
        let record = decode_str("Lyric:\n\tOrder:\n\t\t- Verse\n\t\t- Chorus");
        assert_eq!(record.lyric.order, vec!["Verse".to_string(), "Chorus".to_string()]);
    }

    #[test]
    fn test_lyric_skips_unknown_nested_names() {
        let record = decode_str("Lyric:\n\tTempo: fast\n\tOrder:\n\t\t- Verse");
        assert_eq!(record.lyric.order, vec!["Verse".to_string()]);
    }

    #[test]
    fn test_lyric_block_ends_at_smaller_indent() {
        // The line after the block dedents to the top level, so the block
        // closes and `Title` is decoded as a top-level attribute.
        let record = decode_str("Lyric:\n\tTempo: fast\nTitle: After");
        assert_eq!(record.lyric, Lyric::default());
        assert_eq!(record.title.as_deref(), Some("After"));
    }

    #[test]
    fn test_full_document() {
        let source = "# A song file.\nTitle: Aurora\nAuthor: Someone\n\nArtist: Band\nAlbum: Record\nLyric:\n\tOrder:\n\t\t- Verse\n\t\t- Chorus\n\t\t- Verse";
        let record = decode_str(source);
        assert_eq!(
            record,
            Alf {
                title: Some("Aurora".into()),
                author: Some("Someone".into()),
                artist: Some("Band".into()),
                album: Some("Record".into()),
                lyric: Lyric {
                    order: vec!["Verse".into(), "Chorus".into(), "Verse".into()],
                },
                ..Alf::default()
            }
        );
    }

    #[test]
    fn test_unknown_attribute() {
        let (record, err) = decode("Bogus: nothing".as_bytes());
        assert_eq!(record, Alf::default());
        match err {
            Some(DecodeError::UnknownAttribute { name, line: 0, col: 0 }) => {
                assert_eq!(name, "Bogus");
            }
            other => panic!("expected UnknownAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_attribute_keeps_partial_record() {
        let (record, err) = decode("Title: Kept\nBogus: dropped".as_bytes());
        assert_eq!(record.title.as_deref(), Some("Kept"));
        let err = err.expect("unknown attribute must be reported");
        assert!(err.to_string().contains("unknown attribute name \"Bogus\""));
    }

    #[test]
    fn test_malformed_input_propagates() {
        let (record, err) = decode("Title: Fine\n?".as_bytes());
        assert_eq!(record.title.as_deref(), Some("Fine"));
        assert!(matches!(
            err,
            Some(DecodeError::Lex(LexError::UnexpectedByte { byte: b'?', line: 1, col: 0 }))
        ));
    }

    /// Byte source that fails on the first read.
    struct FailingReader(&'static str);

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other(self.0))
        }
    }

    #[test]
    fn test_reader_error_propagates() {
        let (record, err) = decode(FailingReader("boom"));
        assert_eq!(record, Alf::default());
        let err = err.expect("reader failure must be reported");
        assert!(matches!(err, DecodeError::Lex(LexError::Io(_))));
        assert_eq!(err.to_string(), "boom");
    }
}
