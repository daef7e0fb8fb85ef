//! Streaming lexer for Aurora Lyrics Format (ALF) source.
//!
//! Converts a byte source into a sequence of located [`Item`]s, handling:
//! - Attribute names, colons, and inline values
//! - Indentation runs and list markers
//! - Comments (`#` to end of line)
//! - Line/column accounting, including single-byte putback across newlines
//!
//! The machine is an explicit state tag driven by one-byte lookahead. Each
//! finite input yields a finite item sequence ending in exactly one terminal
//! item: `Eof`, or `Error` with the failure latched on the lexer for later
//! retrieval.
//!
//! ## Module Structure
//!
//! - `items` - Item types (Token, Item)

pub mod items;

pub use items::{Item, Token};

use std::io::{self, BufReader, Read};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::diagnostics::LexError;

// ============================================================================
// LEXER STATE
// ----------------------------------------------------------------------------
// Lexer state diagram (simplified):
//
// [Init] → '\n' → [Newline] → Init
//        → '#'  → [Comment] → Init
//        → ' '  → [Indent]  → Init
//        → '-'  → [List]    → Whitespace? → Text → Init
//        → A-Z  → [Name]    → Colon → Whitespace? → Text → Init
//        → end  → emit EOF/Error, stop
// ============================================================================

/// Machine state. `Init` is the sole entry point; every other state emits at
/// most one item per visit and hands control back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    Newline,
    Indent,
    Comment,
    Name,
    Colon,
    List,
    Whitespace,
    Text,
}

/// Lexer for ALF source.
///
/// Iterating yields located items; after the terminal item the iterator is
/// exhausted. Construction consumes the byte source.
pub struct Lexer<R: Read> {
    reader: BufReader<R>,
    /// One-byte lookahead/putback slot.
    pending: Option<u8>,
    state: State,
    line: usize,
    col: usize,
    /// Column width of the last completed line, so a putback across a `\n`
    /// can restore the previous position.
    last_col: usize,
    /// Whether the most recently consumed byte was a `\n`.
    crossed_newline: bool,
    /// Literal text of the in-progress item.
    literal: Vec<u8>,
    /// Position of the first byte appended to `literal`.
    start: Option<(usize, usize)>,
    error: Option<LexError>,
    done: bool,
}

impl<R: Read> Lexer<R> {
    /// Create a new lexer over the given byte source.
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
            pending: None,
            state: State::Init,
            line: 0,
            col: 0,
            last_col: 0,
            crossed_newline: false,
            literal: Vec::new(),
            start: None,
            error: None,
            done: false,
        }
    }

    /// The error behind a terminal `Error` item, if any.
    ///
    /// Returns `None` before an `Error` item has been produced, and after the
    /// error has been taken once.
    pub fn take_error(&mut self) -> Option<LexError> {
        self.error.take()
    }

    // ========================================================================
    // Byte handling and position accounting
    // ========================================================================

    /// Read one byte from the source, latching the first read failure.
    fn fill(&mut self) -> Option<u8> {
        if self.error.is_some() {
            return None;
        }
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return None,
                Ok(_) => return Some(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.error = Some(LexError::Io(e));
                    return None;
                }
            }
        }
    }

    /// Look at the next byte without consuming it. `None` on end of input or
    /// after a read failure.
    fn peek_byte(&mut self) -> Option<u8> {
        if self.pending.is_none() {
            self.pending = self.fill();
        }
        self.pending
    }

    /// Consume the next byte, updating the line/column accounting. The line
    /// counter increments after a `\n` is consumed, so the newline itself is
    /// counted on the line it terminates.
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.pending.take().or_else(|| self.fill())?;
        if byte == b'\n' {
            self.crossed_newline = true;
            self.last_col = self.col;
            self.line += 1;
            self.col = 0;
        } else {
            self.crossed_newline = false;
            self.col += 1;
        }
        Some(byte)
    }

    /// Put a single byte back, restoring the previous position, across a
    /// newline boundary if necessary.
    fn backup(&mut self, byte: u8) {
        debug_assert!(self.pending.is_none(), "only one byte of putback");
        self.pending = Some(byte);
        if self.crossed_newline {
            self.line -= 1;
            self.col = self.last_col;
            self.last_col = 0;
            self.crossed_newline = false;
        } else {
            self.col -= 1;
        }
    }

    /// Consume the next byte into the in-progress literal, capturing the
    /// item's start position on the first byte.
    fn bump(&mut self) {
        if self.start.is_none() {
            self.start = Some((self.line, self.col));
        }
        if let Some(byte) = self.next_byte() {
            self.literal.push(byte);
        }
    }

    /// Consume a maximal run of bytes matching `pred` into the literal.
    fn accept_run(&mut self, pred: impl Fn(u8) -> bool) {
        while let Some(byte) = self.peek_byte() {
            if !pred(byte) {
                break;
            }
            self.bump();
        }
    }

    /// Finish the in-progress item. Items with no appended bytes (terminals,
    /// empty text) report the current position.
    fn emit(&mut self, token: Token) -> Item {
        let literal = String::from_utf8_lossy(&self.literal).into_owned();
        self.literal.clear();
        let (line, col) = self.start.take().unwrap_or((self.line, self.col));
        Item::new(token, literal, line, col)
    }

    /// Latch a malformed-input error at the current position and finish with
    /// the terminal `Error` item.
    fn fail(&mut self, byte: u8) -> Item {
        self.error = Some(LexError::UnexpectedByte {
            byte,
            line: self.line,
            col: self.col,
        });
        self.done = true;
        self.literal.clear();
        self.start = None;
        Item::new(Token::Error, String::new(), self.line, self.col)
    }

    // ========================================================================
    // State machine
    // ========================================================================

    /// Run the machine until one item is produced. Returns `None` once the
    /// terminal item has been emitted.
    fn next_item(&mut self) -> Option<Item> {
        if self.done {
            return None;
        }
        loop {
            match self.state {
                // Route on one-byte lookahead; emits only the terminals.
                State::Init => match self.peek_byte() {
                    None => {
                        self.done = true;
                        let token = if self.error.is_some() { Token::Error } else { Token::Eof };
                        return Some(self.emit(token));
                    }
                    Some(b'\n') => self.state = State::Newline,
                    Some(b'#') => self.state = State::Comment,
                    Some(b' ') | Some(b'\t') => self.state = State::Indent,
                    Some(b'-') => self.state = State::List,
                    Some(byte) if byte.is_ascii_alphabetic() => self.state = State::Name,
                    Some(byte) => return Some(self.fail(byte)),
                },
                State::Newline => {
                    self.bump();
                    self.state = State::Init;
                    return Some(self.emit(Token::Newline));
                }
                State::Indent => {
                    self.accept_run(|byte| byte == b' ' || byte == b'\t');
                    self.state = State::Init;
                    return Some(self.emit(Token::Indent));
                }
                State::Comment => {
                    let item = self.lex_comment();
                    self.state = State::Init;
                    return Some(item);
                }
                State::Name => {
                    self.accept_run(|byte| byte.is_ascii_alphabetic());
                    self.state = State::Colon;
                    return Some(self.emit(Token::Name));
                }
                State::Colon => match self.peek_byte() {
                    Some(b':') => {
                        self.bump();
                        let item = self.emit(Token::Colon);
                        // A single following space separates the colon from an
                        // inline value; otherwise the value is a nested block.
                        self.state = if self.peek_byte() == Some(b' ') {
                            State::Whitespace
                        } else {
                            State::Init
                        };
                        return Some(item);
                    }
                    // End of input after a bare name is a plain EOF.
                    None => self.state = State::Init,
                    Some(byte) => return Some(self.fail(byte)),
                },
                State::List => {
                    self.bump();
                    let item = self.emit(Token::List);
                    self.state = if self.peek_byte() == Some(b' ') {
                        State::Whitespace
                    } else {
                        State::Init
                    };
                    return Some(item);
                }
                State::Whitespace => {
                    self.bump();
                    self.state = State::Text;
                    return Some(self.emit(Token::Whitespace));
                }
                State::Text => {
                    let item = self.lex_text();
                    self.state = State::Init;
                    return Some(item);
                }
            }
        }
    }

    /// `#` and everything up to, not including, the next `\n` or end of input.
    fn lex_comment(&mut self) -> Item {
        self.bump();
        loop {
            match self.next_byte() {
                None => break,
                Some(b'\n') => {
                    self.backup(b'\n');
                    break;
                }
                Some(byte) => self.literal.push(byte),
            }
        }
        self.emit(Token::Comment)
    }

    /// Everything up to, not including, the next `\n` or end of input. May be
    /// empty; an empty text reports the position it would have started at.
    fn lex_text(&mut self) -> Item {
        self.start = Some((self.line, self.col));
        loop {
            match self.next_byte() {
                None => break,
                Some(b'\n') => {
                    self.backup(b'\n');
                    break;
                }
                Some(byte) => self.literal.push(byte),
            }
        }
        self.emit(Token::Text)
    }
}

impl<R: Read> Iterator for Lexer<R> {
    type Item = Item;

    fn next(&mut self) -> Option<Item> {
        self.next_item()
    }
}

// ============================================================================
// PRODUCER/CONSUMER MODE
// ============================================================================

/// Handle to a lexer running as a producer on its own thread.
///
/// Provided for error retrieval after a terminal `Error` item has been
/// received on the paired channel.
pub struct LexerHandle {
    error: Arc<Mutex<Option<LexError>>>,
}

impl LexerHandle {
    /// The error behind a terminal `Error` item, if any.
    ///
    /// The producer publishes the error before sending the `Error` item, so
    /// this is valid as soon as that item has been received.
    pub fn take_error(&self) -> Option<LexError> {
        let mut slot = match self.error.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.take()
    }
}

impl<R: Read + Send + 'static> Lexer<R> {
    /// Start a lexer as a producer on its own thread, yielding items through
    /// a rendezvous channel.
    ///
    /// The producer blocks whenever it has an item ready and the consumer has
    /// not picked up the previous one. A consumer that reads until the
    /// terminal item lets the producer finish; a consumer that abandons the
    /// stream early releases it by dropping the receiver, which makes the
    /// next send fail and the producer return.
    #[tracing::instrument(skip_all)]
    pub fn spawn(source: R) -> (LexerHandle, Receiver<Item>) {
        let (sender, receiver) = mpsc::sync_channel(0);
        let slot = Arc::new(Mutex::new(None));
        let handle = LexerHandle {
            error: Arc::clone(&slot),
        };

        thread::spawn(move || {
            let mut lexer = Lexer::new(source);
            while let Some(item) = lexer.next_item() {
                if item.token == Token::Error {
                    // Publish before sending so the consumer can query the
                    // handle as soon as it sees the item.
                    let mut guard = match slot.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    *guard = lexer.take_error();
                }
                if sender.send(item).is_err() {
                    return;
                }
            }
        });

        (handle, receiver)
    }
}

// ============================================================================
// TESTS
// ============================================================================
