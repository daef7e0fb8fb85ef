//! Token and item types shared by the lexer and the decoder.
//!
//! ## Notes
//! - An [`Item`] is a located token: `(token, literal, line, col)` with the
//!   position of the literal's first byte, both zero-based.
//! - Concatenating the literals of all non-terminal items reproduces the
//!   source byte-for-byte.

use std::fmt;

// ============================================================================
// TOKEN KINDS
// ============================================================================

/// Kind of item produced by the lexer, one per part of the ALF grammar.
///
/// Every item stream ends with exactly one terminal kind: [`Token::Eof`] or
/// [`Token::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// An I/O or lexing failure occurred; terminal.
    Error,
    /// End of input; terminal.
    Eof,
    /// A single `\n`.
    Newline,
    /// The single space separating a colon or list marker from its value.
    Whitespace,
    /// A run of leading spaces and/or tabs at the start of a line.
    Indent,
    /// The `:` separating an attribute name from its value.
    Colon,
    /// `#` followed by the rest of the line, excluding the trailing newline.
    Comment,
    /// A run of ASCII letters forming an attribute identifier.
    Name,
    /// The `-` marker opening a list item.
    List,
    /// Literal value text running to the end of the line.
    Text,
}

impl Token {
    /// Debugging name of the token kind.
    pub fn name(self) -> &'static str {
        match self {
            Token::Error => "Error",
            Token::Eof => "EOF",
            Token::Newline => "Newline",
            Token::Whitespace => "Whitespace",
            Token::Indent => "Indent",
            Token::Colon => "Colon",
            Token::Comment => "Comment",
            Token::Name => "Name",
            Token::List => "List",
            Token::Text => "Text",
        }
    }

    /// Whether this kind ends the item stream.
    pub fn is_terminal(self) -> bool {
        matches!(self, Token::Eof | Token::Error)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// LOCATED ITEMS
// ============================================================================

/// A token together with its literal text and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub token: Token,
    /// The literal text as it appears in the source.
    pub literal: String,
    /// Zero-based line of the literal's first byte.
    pub line: usize,
    /// Zero-based column of the literal's first byte.
    pub col: usize,
}

impl Item {
    /// Construct a new located item.
    pub fn new(token: Token, literal: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            token,
            literal: literal.into(),
            line,
            col,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Item ({})[{}:{}] {:?}>",
            self.token, self.line, self.col, self.literal
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_names() {
        assert_eq!(Token::Eof.name(), "EOF");
        assert_eq!(Token::Name.name(), "Name");
        assert_eq!(Token::List.to_string(), "List");
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(Token::Eof.is_terminal());
        assert!(Token::Error.is_terminal());
        assert!(!Token::Text.is_terminal());
    }

    #[test]
    fn test_item_display() {
        let item = Item::new(Token::Name, "Title", 0, 0);
        assert_eq!(item.to_string(), "<Item (Name)[0:0] \"Title\">");
    }
}
