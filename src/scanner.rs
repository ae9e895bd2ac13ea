//! The external scanner of the Stata grammar.
//!
//! Stata treats `*` as a comment only when it is the first non-whitespace
//! character on a line. Everywhere else it is the multiplication operator.
//! A table driven lexer cannot tell the two apart, so the parsing engine asks
//! this scanner for a `LineStart` token at every position where a statement
//! may begin, and the scanner answers from a single piece of state: whether
//! anything but horizontal whitespace has been checked since the last newline.
//!
//! The state survives incremental reparses through [`Scanner::serialize`] and
//! [`Scanner::deserialize`], as a single byte.

use log::trace;

/// The character opening a star comment when found at line start
const COMMENT_MARKER: char = '*';

/// Tokens produced by the external scanner.
///
/// The discriminant is the index of the token in the grammar's list of
/// external tokens, and therefore in the valid symbols array.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u16)]
pub enum ExternalToken {
    /// Empty token emitted right before a `*` opening a star comment
    LineStart = 0,
}

/// Number of external tokens declared by the grammar
pub const EXTERNAL_TOKEN_COUNT: usize = 1;

impl ExternalToken {
    pub fn symbol(self) -> u16 {
        self as u16
    }
}

/// The external tokens the parser can accept at the current position.
#[derive(Debug, Clone, Copy)]
pub struct ValidSymbols<'a>(&'a [bool]);

impl<'a> ValidSymbols<'a> {
    pub fn new(flags: &'a [bool]) -> ValidSymbols<'a> {
        ValidSymbols(flags)
    }

    pub fn all() -> ValidSymbols<'static> {
        ValidSymbols(&[true; EXTERNAL_TOKEN_COUNT])
    }

    pub fn none() -> ValidSymbols<'static> {
        ValidSymbols(&[false; EXTERNAL_TOKEN_COUNT])
    }

    pub fn contains(&self, token: ExternalToken) -> bool {
        self.0.get(token as usize).copied().unwrap_or(false)
    }
}

/// The view of the input the scanner needs from its host lexer.
pub trait Lexer {
    /// The next character, or `None` at the end of input
    fn lookahead(&self) -> Option<char>;

    /// Consume the lookahead. `skip` marks the character as whitespace
    /// which isn't part of the produced token.
    fn advance(&mut self, skip: bool);
}

/// Where the lexer cursor sits relative to the current line.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LinePosition {
    /// Nothing but horizontal whitespace since the last newline
    LineStart,
    /// A character other than the comment marker has been checked on this line
    MidLine,
}

impl Default for LinePosition {
    fn default() -> Self {
        LinePosition::LineStart
    }
}

/// The line start tracker. One instance lives for the whole parse session.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Scanner {
    position: LinePosition,
}

impl Scanner {
    pub fn new() -> Scanner {
        Scanner::default()
    }

    pub fn position(&self) -> LinePosition {
        self.position
    }

    pub fn at_line_start(&self) -> bool {
        self.position == LinePosition::LineStart
    }

    /// Try to produce an external token at the lexer's position.
    ///
    /// Returns the recognized token, or `None` when the scanner declines. The
    /// newline bookkeeping happens on every call, whatever the valid symbols.
    pub fn scan<L: Lexer + ?Sized>(
        &mut self,
        lexer: &mut L,
        valid_symbols: ValidSymbols,
    ) -> Option<ExternalToken> {
        if valid_symbols.contains(ExternalToken::LineStart) && self.at_line_start() {
            skip_whitespace(lexer);

            if lexer.lookahead() == Some(COMMENT_MARKER) {
                trace!("scan: line start before comment marker");
                return Some(ExternalToken::LineStart);
            }

            trace!("scan: {:?} found at line start", lexer.lookahead());
            self.position = LinePosition::MidLine;
        }

        if let Some('\n') | Some('\r') = lexer.lookahead() {
            self.position = LinePosition::LineStart;
        }

        None
    }

    /// Write the state in `buffer`, returning the number of bytes used.
    pub fn serialize(&self, buffer: &mut [u8]) -> usize {
        match buffer.first_mut() {
            Some(byte) => {
                *byte = self.at_line_start() as u8;
                1
            }
            None => 0,
        }
    }

    /// Restore a state written by `serialize`. An empty buffer means the
    /// host has no saved state, and we start over at line start.
    pub fn deserialize(&mut self, buffer: &[u8]) {
        self.position = match buffer.first() {
            Some(0) => LinePosition::MidLine,
            Some(_) | None => LinePosition::LineStart,
        };
    }
}

fn skip_whitespace<L: Lexer + ?Sized>(lexer: &mut L) {
    while let Some(' ') | Some('\t') = lexer.lookahead() {
        lexer.advance(true);
    }
}
