//! Turn Stata source code into a serie of tokens.
//!
//! Stata lexing is context sensitive in a few places, which this tokenizer
//! resolves before the parser sees anything:
//!
//! - `*` opens a comment only at the start of a line. The decision is taken
//!   by the external [`Scanner`], which we consult at every token boundary
//!   and allow to produce a `LineStart` token where a statement may begin.
//! - strings, compound strings and local macros nest into each other and
//!   don't follow the lexical rules of the code around them. We keep a stack
//!   of modes to know which rules apply.
//! - keywords are only keywords at the right place: `program` or `local`
//!   start a statement, but are plain identifiers as arguments.
//! - the content of a mata block is not Stata, we keep it as raw text.

use crate::position::{spanned, Position, Spanned};
use crate::scanner::{ExternalToken, Lexer, Scanner, ValidSymbols};
use log::trace;
use std::collections::VecDeque;
use std::fmt;

/// Nesting depth at which compound strings and local macros wrap back to 1
const MAX_DEPTH: usize = 6;

/// Represents the different part which constitute a Stata source file
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Newline,

    // Comments
    /// Empty token placed right before the `*` of a star comment
    LineStart,
    /// The comment marker after a `LineStart`, and the multiplication operator otherwise
    Star,
    /// Text of a star comment, after the marker
    RestOfLine(String),
    /// `// text`
    LineComment(String),
    /// `/// text`
    ContinuationComment(String),
    /// `/* text */`
    BlockComment(String),

    // Strings
    DoubleQuote,
    CloseQuote,
    /// `` `" `` with its nesting depth
    CompoundOpen(u8),
    /// `"'`
    CompoundClose,
    StringText(String),
    /// `\x` within a double string
    Escape(char),
    /// `""` within a double string
    EscapedQuote,

    // Macros
    /// `` ` `` with its nesting depth
    LocalMacroOpen(u8),
    /// `'`
    LocalMacroClose,
    /// `` `=exp' `` and `` `:fcn' `` content, including the leading `=` or `:`
    MacroExpression(String),
    Dollar,
    DollarBrace,

    // Keywords
    Program,
    Define,
    /// `drop`, `dir` or `list` right after `program`
    Subcommand(String),
    End,
    Mata,
    Local(String),
    Global(String),
    Temp(String),
    Prefix(String),
    Control(String),
    Type(String),
    Builtin(String),

    // Atoms
    Identifier(String),
    Number(String),
    Missing(String),
    Operator(String),

    // Symbols
    Colon,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,

    // Mata
    MataText(String),
    MataLine(String),

    /// Anything else which isn't whitespace
    Other(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Newline => write!(f, "newline"),
            Token::LineStart => write!(f, "line start"),
            Token::Star => write!(f, "*"),
            Token::RestOfLine(text) => write!(f, "{}", text),
            Token::LineComment(text) => write!(f, "//{}", text),
            Token::ContinuationComment(text) => write!(f, "///{}", text),
            Token::BlockComment(text) => write!(f, "/*{}*/", text),
            Token::DoubleQuote | Token::CloseQuote => write!(f, "\""),
            Token::CompoundOpen(_) => write!(f, "`\""),
            Token::CompoundClose => write!(f, "\"'"),
            Token::Escape(c) => write!(f, "\\{}", c),
            Token::EscapedQuote => write!(f, "\"\""),
            Token::LocalMacroOpen(_) => write!(f, "`"),
            Token::LocalMacroClose => write!(f, "'"),
            Token::Dollar => write!(f, "$"),
            Token::DollarBrace => write!(f, "${{"),
            Token::Program => write!(f, "program"),
            Token::Define => write!(f, "define"),
            Token::End => write!(f, "end"),
            Token::Mata => write!(f, "mata"),
            Token::Colon => write!(f, ":"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::StringText(s)
            | Token::MacroExpression(s)
            | Token::Local(s)
            | Token::Global(s)
            | Token::Temp(s)
            | Token::Subcommand(s)
            | Token::Prefix(s)
            | Token::Control(s)
            | Token::Type(s)
            | Token::Builtin(s)
            | Token::Identifier(s)
            | Token::Number(s)
            | Token::Missing(s)
            | Token::Operator(s)
            | Token::MataText(s)
            | Token::MataLine(s)
            | Token::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Represents an error during tokenization.
#[derive(Debug, PartialEq, Clone)]
pub struct TokenizerError {
    pub error: Spanned<Position, TokenizerErrorType>,
}

/// The type of error refered in `TokenizerError`
#[derive(Debug, PartialEq, Clone)]
pub enum TokenizerErrorType {
    UnterminatedString,
    UnterminatedCompoundString,
    UnterminatedBlockComment,
    UnterminatedLocalMacro,
    InvalidLocalMacro { found: char },
    InvalidGlobalMacro,
    UnterminatedMata,
}

/// A `Token` enriched with its starting and ending position in the source code
pub type SpannedToken = Spanned<Position, Token>;

/// Represent a standard `Result` scoped to a `TokenizerError`
pub type Result<T> = std::result::Result<T, TokenizerError>;

fn error<T>(start: Position, end: Position, error: TokenizerErrorType) -> Result<T> {
    Err(TokenizerError {
        error: spanned(start, end, error),
    })
}

/// Take a source code and return an iterator of [`SpannedToken`](type.SpannedToken.html)
///
/// This is the access point of this module, and the only way to create the underlying
/// `Tokenizer` (although it isn't exposed to public consumption)
pub fn make_tokenizer<'a>(source: &'a str) -> impl Iterator<Item = Result<SpannedToken>> + 'a {
    Tokenizer::new(source.chars())
}

/// A character iterator with three characters of lookahead, keeping track of
/// the position of the first one.
struct Cursor<I: Iterator<Item = char>> {
    chars: I,
    lookahead: (Option<char>, Option<char>, Option<char>), // current char, next and +1
    position: Position,
}

impl<I> Cursor<I>
where
    I: Iterator<Item = char>,
{
    fn new(mut chars: I) -> Cursor<I> {
        let lookahead = (chars.next(), chars.next(), chars.next());

        Cursor {
            chars,
            lookahead,
            position: Position::new(0, 1, 1),
        }
    }

    // Advance the iterator by one character, moving the position along.
    fn next_char(&mut self) -> Option<char> {
        let current = self.lookahead.0;

        self.lookahead.0 = self.lookahead.1;
        self.lookahead.1 = self.lookahead.2;
        self.lookahead.2 = self.chars.next();

        match current {
            Some('\n') => self.position.new_line(1),
            // a lone `\r` is a line terminator, `\r\n` ends on the `\n`
            Some('\r') if self.lookahead.0 != Some('\n') => self.position.new_line(1),
            Some(c) => self.position.increment_by(c.len_utf8()),
            None => (),
        }

        current
    }

    fn take_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> String {
        let mut taken = String::new();

        while let Some(c) = self.lookahead.0 {
            if !predicate(c) {
                break;
            }
            taken.push(c);
            self.next_char();
        }

        taken
    }

    /// Consume everything up to the line terminator, which stays in the lookahead
    fn rest_of_line(&mut self) -> String {
        self.take_while(|c| !is_newline(c))
    }
}

impl<I> Lexer for Cursor<I>
where
    I: Iterator<Item = char>,
{
    fn lookahead(&self) -> Option<char> {
        self.lookahead.0
    }

    fn advance(&mut self, _skip: bool) {
        self.next_char();
    }
}

/// The lexical rules currently in force, when not plain code
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    DoubleString { open: Position },
    Compound { open: Position },
    LocalMacro { open: Position },
}

/// Where we are within the current statement, used to tell keywords apart
/// from identifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Context {
    /// Beginning of a statement
    Start,
    /// After a prefix like `quietly`, a command name is expected
    AfterPrefix,
    /// After `program`, where `define` or a subcommand may appear
    AfterProgram,
    /// The name of a program being defined
    ProgramName,
    Arguments,
}

/// What a word turns into, given its context
enum Word {
    Program,
    Define,
    Subcommand,
    End,
    Mata,
    Local,
    Global,
    Temp,
    Prefix,
    Control,
    Type,
    Builtin,
    Identifier,
}

/// Tokenizer is an iterator which consume a source and produces `Result<SpannedToken>`
///
/// We use an intermediate queue between the processing and the iterator's
/// next because some characters produce more than one token (eg. a star
/// comment, a global macro or a mata block).
struct Tokenizer<I: Iterator<Item = char>> {
    cursor: Cursor<I>,
    scanner: Scanner,
    modes: Vec<Mode>,
    context: Context,
    /// No token has been emitted since the last newline
    line_fresh: bool,
    processed_tokens: VecDeque<SpannedToken>, // Tokens we have parsed but not yet emitted
    done: bool,
}

impl<I> Tokenizer<I>
where
    I: Iterator<Item = char>,
{
    fn new(chars: I) -> Tokenizer<I> {
        Tokenizer {
            cursor: Cursor::new(chars),
            scanner: Scanner::new(),
            modes: vec![],
            context: Context::Start,
            line_fresh: true, // Nothing have been read yet, so…
            processed_tokens: VecDeque::new(),
            done: false,
        }
    }

    fn emit(&mut self, start: Position, token: Token) {
        let end = self.cursor.position;

        if token == Token::Newline {
            self.line_fresh = true;
            self.context = Context::Start;
        } else {
            self.line_fresh = false;
        }

        trace!("emit: {:?} ({} to {})", token, start, end);
        self.processed_tokens.push_back(spanned(start, end, token));
    }

    fn process_next_tokens(&mut self) -> Result<Option<SpannedToken>> {
        while self.processed_tokens.is_empty() {
            if self.done {
                return Ok(None);
            }

            match self.modes.last().copied() {
                None => self.consume_code()?,
                Some(Mode::DoubleString { open }) => self.consume_double_string(open)?,
                Some(Mode::Compound { open }) => self.consume_compound_string(open)?,
                Some(Mode::LocalMacro { open }) => self.consume_local_macro(open)?,
            }
        }

        Ok(self.processed_tokens.pop_front())
    }

    //
    // Character consumption helpers
    //

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.cursor.lookahead.0 {
            if !c.is_whitespace() || is_newline(c) {
                break;
            }
            self.cursor.next_char();
        }
    }

    /// Consume a `\n`, `\r\n` or `\r` line terminator
    fn consume_line_terminator(&mut self) {
        if self.cursor.next_char() == Some('\r') && self.cursor.lookahead.0 == Some('\n') {
            self.cursor.next_char();
        }
    }

    /// Number of modes of the same kind directly enclosing the current position,
    /// turned into a depth between 1 and `MAX_DEPTH`.
    fn nesting_depth(&self, same_kind: fn(&Mode) -> bool) -> u8 {
        let nested = self.modes.iter().rev().take_while(|m| same_kind(m)).count();

        (nested % MAX_DEPTH) as u8 + 1
    }

    fn open_compound_string(&mut self, start: Position) {
        let depth = self.nesting_depth(|m| matches!(m, Mode::Compound { .. }));

        self.cursor.next_char();
        self.cursor.next_char();
        self.modes.push(Mode::Compound { open: start });
        self.emit(start, Token::CompoundOpen(depth));
    }

    fn open_local_macro(&mut self, start: Position) {
        let depth = self.nesting_depth(|m| matches!(m, Mode::LocalMacro { .. }));

        self.cursor.next_char();
        self.modes.push(Mode::LocalMacro { open: start });
        self.emit(start, Token::LocalMacroOpen(depth));
    }

    fn open_double_string(&mut self, start: Position) {
        self.cursor.next_char();
        self.modes.push(Mode::DoubleString { open: start });
        self.emit(start, Token::DoubleQuote);
    }

    /// Consume `$name` or `${name}`. A `$` which doesn't start a global macro
    /// is emitted as `lone_dollar`, or is an error when there is none.
    fn consume_global_macro(&mut self, lone_dollar: Option<Token>) -> Result<()> {
        let start = self.cursor.position;

        match self.cursor.lookahead {
            (Some('$'), Some('{'), _) => {
                self.cursor.next_char();
                self.cursor.next_char();
                self.emit(start, Token::DollarBrace);

                self.consume_global_name(start)?;

                if self.cursor.lookahead.0 != Some('}') {
                    return error(start, self.cursor.position, TokenizerErrorType::InvalidGlobalMacro);
                }
                let close = self.cursor.position;
                self.cursor.next_char();
                self.emit(close, Token::RBrace);

                Ok(())
            }
            (Some('$'), Some(c), _) if is_identifier_start(c) => {
                self.cursor.next_char();
                self.emit(start, Token::Dollar);

                self.consume_global_name(start)
            }
            _ => match lone_dollar {
                Some(token) => {
                    self.cursor.next_char();
                    self.emit(start, token);
                    Ok(())
                }
                None => {
                    self.cursor.next_char();
                    error(start, self.cursor.position, TokenizerErrorType::InvalidGlobalMacro)
                }
            },
        }
    }

    fn consume_global_name(&mut self, macro_start: Position) -> Result<()> {
        let start = self.cursor.position;

        match self.cursor.lookahead.0 {
            Some(c) if is_identifier_start(c) => {
                let name = self.cursor.take_while(is_identifier_char);
                self.emit(start, Token::Identifier(name));
                Ok(())
            }
            _ => error(macro_start, start, TokenizerErrorType::InvalidGlobalMacro),
        }
    }

    //
    // Token processing
    //

    /// Lexical rules of plain code, outside of any string or macro
    fn consume_code(&mut self) -> Result<()> {
        let valid_symbols = if self.line_fresh {
            ValidSymbols::all()
        } else {
            ValidSymbols::none()
        };

        if let Some(ExternalToken::LineStart) = self.scanner.scan(&mut self.cursor, valid_symbols) {
            return self.consume_star_comment();
        }

        self.skip_whitespace();

        let start = self.cursor.position;
        let context = self.context;
        self.context = Context::Arguments;

        match self.cursor.lookahead {
            (None, _, _) => self.end_of_input(),
            (Some(c), _, _) if is_newline(c) => {
                self.consume_line_terminator();
                self.emit(start, Token::Newline);
            }
            (Some('/'), Some('/'), Some('/')) => {
                self.cursor.next_char();
                self.cursor.next_char();
                self.cursor.next_char();
                let text = self.cursor.rest_of_line();
                self.emit(start, Token::ContinuationComment(text));
            }
            (Some('/'), Some('/'), _) => {
                self.cursor.next_char();
                self.cursor.next_char();
                let text = self.cursor.rest_of_line();
                self.emit(start, Token::LineComment(text));
            }
            (Some('/'), Some('*'), _) => self.consume_block_comment(start)?,
            (Some('"'), _, _) => self.open_double_string(start),
            (Some('`'), Some('"'), _) => self.open_compound_string(start),
            (Some('`'), _, _) => self.open_local_macro(start),
            (Some('$'), _, _) => self.consume_global_macro(Some(Token::Other("$".to_owned())))?,
            (Some(c), _, _) if c.is_ascii_digit() => self.consume_number(start),
            (Some('.'), Some(c), _) if c.is_ascii_digit() => self.consume_number(start),
            (Some('.'), next, _) => {
                self.cursor.next_char();
                let mut missing = ".".to_owned();
                if let Some(c @ 'a'..='z') = next {
                    self.cursor.next_char();
                    missing.push(c);
                }
                self.emit(start, Token::Missing(missing));
            }
            (Some(c), _, _) if is_identifier_start(c) => self.consume_word(start, context)?,
            (Some('*'), _, _) => {
                self.cursor.next_char();
                self.emit(start, Token::Star);
            }
            (Some(c), Some('='), _) if matches!(c, '=' | '!' | '~' | '<' | '>') => {
                self.cursor.next_char();
                self.cursor.next_char();
                self.emit(start, Token::Operator(format!("{}=", c)));
            }
            (Some(c), _, _) if is_operator(c) => {
                self.cursor.next_char();
                self.emit(start, Token::Operator(c.to_string()));
            }
            (Some(c), _, _) if is_symbol(c) => {
                self.cursor.next_char();
                let token = match c {
                    ':' => Token::Colon,
                    '{' => Token::LBrace,
                    '}' => {
                        // a closing brace may be followed by a statement (`} else {`)
                        if context == Context::Start {
                            self.context = Context::Start;
                        }
                        Token::RBrace
                    }
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                };
                self.emit(start, token);
            }
            (Some(_), _, _) => {
                let text = self
                    .cursor
                    .take_while(|c| !c.is_whitespace() && !starts_token(c));
                self.emit(start, Token::Other(text));
            }
        }

        Ok(())
    }

    /// The scanner found a line start: the lookahead is the comment marker
    fn consume_star_comment(&mut self) -> Result<()> {
        let start = self.cursor.position;
        self.emit(start, Token::LineStart);

        self.cursor.next_char();
        self.emit(start, Token::Star);

        let text_start = self.cursor.position;
        let text = self.cursor.rest_of_line();
        self.emit(text_start, Token::RestOfLine(text));

        self.context = Context::Arguments;
        Ok(())
    }

    fn end_of_input(&mut self) {
        // Insert a trailing Newline if none, this is to simplify the
        // parser step (making it assume there is always a newline at
        // the end).
        if !self.line_fresh {
            let position = self.cursor.position;
            self.emit(position, Token::Newline);
        }

        self.done = true;
    }

    fn consume_block_comment(&mut self, start: Position) -> Result<()> {
        self.cursor.next_char();
        self.cursor.next_char();

        let mut text = String::new();
        loop {
            match self.cursor.lookahead {
                (Some('*'), Some('/'), _) => {
                    self.cursor.next_char();
                    self.cursor.next_char();
                    break;
                }
                (Some(c), _, _) => {
                    text.push(c);
                    self.cursor.next_char();
                }
                (None, _, _) => {
                    return error(
                        start,
                        self.cursor.position,
                        TokenizerErrorType::UnterminatedBlockComment,
                    )
                }
            }
        }

        self.emit(start, Token::BlockComment(text));
        Ok(())
    }

    fn consume_number(&mut self, start: Position) {
        let mut number = self.cursor.take_while(|c| c.is_ascii_digit());
        let has_integer_part = !number.is_empty();

        if self.cursor.lookahead.0 == Some('.') {
            self.cursor.next_char();
            number.push('.');
            number.push_str(&self.cursor.take_while(|c| c.is_ascii_digit()));
        }

        // Exponents are only allowed after an integer part
        if has_integer_part {
            let exponent = match self.cursor.lookahead {
                (Some(e), Some(d), _) if (e == 'e' || e == 'E') && d.is_ascii_digit() => 1,
                (Some(e), Some(s), Some(d))
                    if (e == 'e' || e == 'E') && (s == '+' || s == '-') && d.is_ascii_digit() =>
                {
                    2
                }
                _ => 0,
            };

            if exponent > 0 {
                for _ in 0..exponent {
                    if let Some(c) = self.cursor.next_char() {
                        number.push(c);
                    }
                }
                number.push_str(&self.cursor.take_while(|c| c.is_ascii_digit()));
            }
        }

        self.emit(start, Token::Number(number));
    }

    fn consume_word(&mut self, start: Position, context: Context) -> Result<()> {
        let word = self.cursor.take_while(is_identifier_char);

        let (kind, next_context) = classify_word(&word, context);
        self.context = next_context;

        let token = match kind {
            Word::Program => Token::Program,
            Word::Define => Token::Define,
            Word::Subcommand => Token::Subcommand(word),
            Word::End => Token::End,
            Word::Mata => Token::Mata,
            Word::Local => Token::Local(word),
            Word::Global => Token::Global(word),
            Word::Temp => Token::Temp(word),
            Word::Prefix => Token::Prefix(word),
            Word::Control => Token::Control(word),
            Word::Type => Token::Type(word),
            Word::Builtin => Token::Builtin(word),
            Word::Identifier => Token::Identifier(word),
        };

        if token == Token::Mata {
            self.emit(start, token);
            return self.consume_mata(start);
        }

        self.emit(start, token);
        Ok(())
    }

    /// Consume the body of a mata block, right after the `mata` keyword
    fn consume_mata(&mut self, block_start: Position) -> Result<()> {
        self.skip_whitespace();

        if self.cursor.lookahead.0 == Some(':') {
            let colon = self.cursor.position;
            self.cursor.next_char();
            self.emit(colon, Token::Colon);
            self.skip_whitespace();
        }

        let start = self.cursor.position;
        match self.cursor.lookahead.0 {
            Some('{') => {
                self.cursor.next_char();
                self.emit(start, Token::LBrace);

                let text_start = self.cursor.position;
                let mut text = String::new();
                let mut depth = 0;
                loop {
                    match self.cursor.lookahead.0 {
                        Some('}') if depth == 0 => break,
                        Some(c) => {
                            match c {
                                '{' => depth += 1,
                                '}' => depth -= 1,
                                _ => (),
                            }
                            text.push(c);
                            self.cursor.next_char();
                        }
                        None => {
                            return error(
                                block_start,
                                self.cursor.position,
                                TokenizerErrorType::UnterminatedMata,
                            )
                        }
                    }
                }

                if !text.is_empty() {
                    self.emit(text_start, Token::MataText(text));
                }

                let close = self.cursor.position;
                self.cursor.next_char();
                self.emit(close, Token::RBrace);
            }
            Some(c) if is_newline(c) => {
                self.consume_line_terminator();
                self.emit(start, Token::Newline);

                loop {
                    let line_start = self.cursor.position;
                    let line = self.cursor.rest_of_line();

                    if line.trim() == "end" {
                        self.emit(line_start, Token::End);
                        break;
                    }

                    if self.cursor.lookahead.0.is_none() {
                        return error(
                            block_start,
                            self.cursor.position,
                            TokenizerErrorType::UnterminatedMata,
                        );
                    }

                    self.emit(line_start, Token::MataLine(line));
                    self.consume_line_terminator();
                }
            }
            Some(_) => {
                let text = self
                    .cursor
                    .take_while(|c| c != '{' && !is_newline(c));
                self.emit(start, Token::MataText(text.trim_end().to_owned()));
            }
            None => {
                return error(
                    block_start,
                    self.cursor.position,
                    TokenizerErrorType::UnterminatedMata,
                )
            }
        }

        self.context = Context::Arguments;
        Ok(())
    }

    /// Lexical rules within `"…"`
    fn consume_double_string(&mut self, open: Position) -> Result<()> {
        let start = self.cursor.position;

        match self.cursor.lookahead {
            (None, _, _) => {
                return error(open, start, TokenizerErrorType::UnterminatedString);
            }
            (Some(c), _, _) if is_newline(c) => {
                return error(open, start, TokenizerErrorType::UnterminatedString);
            }
            (Some('"'), Some('"'), _) => {
                self.cursor.next_char();
                self.cursor.next_char();
                self.emit(start, Token::EscapedQuote);
            }
            (Some('"'), _, _) => {
                self.cursor.next_char();
                self.modes.pop();
                self.emit(start, Token::CloseQuote);
            }
            (Some('\\'), Some(c), _) if !is_newline(c) => {
                self.cursor.next_char();
                self.cursor.next_char();
                self.emit(start, Token::Escape(c));
            }
            (Some('$'), _, _) => {
                self.consume_global_macro(Some(Token::StringText("$".to_owned())))?
            }
            (Some(_), _, _) => {
                let mut text = self
                    .cursor
                    .take_while(|c| !matches!(c, '"' | '$' | '\\') && !is_newline(c));

                // a backslash right before the end of the line
                if text.is_empty() {
                    if let Some(c) = self.cursor.next_char() {
                        text.push(c);
                    }
                }

                self.emit(start, Token::StringText(text));
            }
        }

        Ok(())
    }

    /// Lexical rules within `` `"…"' ``
    fn consume_compound_string(&mut self, open: Position) -> Result<()> {
        let start = self.cursor.position;

        match self.cursor.lookahead {
            (None, _, _) => {
                return error(open, start, TokenizerErrorType::UnterminatedCompoundString);
            }
            (Some(c), _, _) if is_newline(c) => {
                return error(open, start, TokenizerErrorType::UnterminatedCompoundString);
            }
            (Some('"'), Some('\''), _) => {
                self.cursor.next_char();
                self.cursor.next_char();
                self.modes.pop();
                self.emit(start, Token::CompoundClose);
            }
            (Some('"'), _, _) => self.open_double_string(start),
            (Some('`'), Some('"'), _) => self.open_compound_string(start),
            (Some('`'), _, _) => self.open_local_macro(start),
            (Some('$'), _, _) => {
                self.consume_global_macro(Some(Token::StringText("$".to_owned())))?
            }
            (Some(_), _, _) => {
                let mut text = String::new();
                loop {
                    match self.cursor.lookahead {
                        (Some('"'), _, _) | (Some('`'), _, _) | (Some('$'), _, _) => break,
                        (Some(c), _, _) if !is_newline(c) => {
                            text.push(c);
                            self.cursor.next_char();
                        }
                        _ => break,
                    }
                }
                self.emit(start, Token::StringText(text));
            }
        }

        Ok(())
    }

    /// Lexical rules within `` `…' ``
    fn consume_local_macro(&mut self, open: Position) -> Result<()> {
        let start = self.cursor.position;

        match self.cursor.lookahead.0 {
            None => return error(open, start, TokenizerErrorType::UnterminatedLocalMacro),
            Some(c) if is_newline(c) => {
                return error(open, start, TokenizerErrorType::UnterminatedLocalMacro)
            }
            Some('\'') => {
                self.cursor.next_char();
                self.modes.pop();
                self.emit(start, Token::LocalMacroClose);
            }
            Some('`') => self.open_local_macro(start),
            Some('$') => self.consume_global_macro(None)?,
            Some('=') | Some(':') => {
                let mut text = String::new();
                let mut nested = 0;
                loop {
                    match self.cursor.lookahead.0 {
                        Some('\'') if nested == 0 => break,
                        Some(c) if !is_newline(c) => {
                            match c {
                                '`' => nested += 1,
                                '\'' => nested -= 1,
                                _ => (),
                            }
                            text.push(c);
                            self.cursor.next_char();
                        }
                        _ => {
                            return error(
                                open,
                                self.cursor.position,
                                TokenizerErrorType::UnterminatedLocalMacro,
                            )
                        }
                    }
                }
                self.emit(start, Token::MacroExpression(text));
            }
            Some(c) if is_identifier_start(c) => {
                let name = self.cursor.take_while(is_identifier_char);
                self.emit(start, Token::Identifier(name));
            }
            Some(c) if c.is_ascii_digit() => {
                let digits = self.cursor.take_while(|c| c.is_ascii_digit());
                self.emit(start, Token::Number(digits));
            }
            Some(found) => {
                self.cursor.next_char();
                return error(
                    start,
                    self.cursor.position,
                    TokenizerErrorType::InvalidLocalMacro { found },
                );
            }
        }

        Ok(())
    }
}

impl<I> Iterator for Tokenizer<I>
where
    I: Iterator<Item = char>,
{
    type Item = Result<SpannedToken>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.process_next_tokens() {
            Ok(token) => token.map(Ok),
            Err(err) => {
                // Nothing sensible can follow an error
                self.done = true;
                self.processed_tokens.clear();
                Some(Err(err))
            }
        }
    }
}

fn classify_word(word: &str, context: Context) -> (Word, Context) {
    match context {
        Context::Start => match word {
            "program" => (Word::Program, Context::AfterProgram),
            "mata" => (Word::Mata, Context::Arguments),
            "end" => (Word::End, Context::Arguments),
            "local" | "loc" => (Word::Local, Context::Arguments),
            "global" | "gl" => (Word::Global, Context::Arguments),
            "tempvar" | "tempname" | "tempfile" => (Word::Temp, Context::Arguments),
            w if is_prefix(w) => (Word::Prefix, Context::AfterPrefix),
            _ => (Word::Identifier, Context::Arguments),
        },
        Context::AfterPrefix if is_prefix(word) => (Word::Prefix, Context::AfterPrefix),
        Context::AfterProgram => match word {
            "define" => (Word::Define, Context::ProgramName),
            "drop" | "dir" | "list" => (Word::Subcommand, Context::Arguments),
            _ => (Word::Identifier, Context::Arguments),
        },
        Context::AfterPrefix | Context::ProgramName => {
            (Word::Identifier, Context::Arguments)
        }
        Context::Arguments => {
            let kind = if is_control_keyword(word) {
                Word::Control
            } else if is_type_keyword(word) {
                Word::Type
            } else if is_builtin_variable(word) {
                Word::Builtin
            } else {
                Word::Identifier
            };

            (kind, Context::Arguments)
        }
    }
}

fn is_newline(c: char) -> bool {
    c == '\n' || c == '\r'
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_operator(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '/' | '^' | '<' | '>' | '&' | '|' | '!' | '~' | '=' | '#'
    )
}

fn is_symbol(c: char) -> bool {
    matches!(c, ':' | '{' | '}' | '[' | ']' | '(' | ')')
}

/// Characters which can't be part of an `Other` run
fn starts_token(c: char) -> bool {
    is_identifier_start(c)
        || c.is_ascii_digit()
        || is_operator(c)
        || is_symbol(c)
        || matches!(c, '"' | '`' | '$' | '.' | '*')
        || is_newline(c)
}

fn is_prefix(word: &str) -> bool {
    matches!(
        word,
        "by" | "bysort"
            | "bys"
            | "quietly"
            | "qui"
            | "noisily"
            | "noi"
            | "capture"
            | "cap"
            | "sortpreserve"
    )
}

fn is_control_keyword(word: &str) -> bool {
    matches!(
        word,
        "if" | "else" | "foreach" | "forvalues" | "forv" | "while" | "continue" | "break" | "end"
    )
}

/// `byte`, `int`, `long`, `float`, `double`, `strL` and `str1` to `str2045`
fn is_type_keyword(word: &str) -> bool {
    match word {
        "byte" | "int" | "long" | "float" | "double" | "strL" => true,
        _ => match word.strip_prefix("str") {
            Some(width) if !width.starts_with('0') && width.len() <= 4 => width
                .parse::<u16>()
                .map(|w| (1..=2045).contains(&w))
                .unwrap_or(false),
            _ => false,
        },
    }
}

fn is_builtin_variable(word: &str) -> bool {
    matches!(
        word,
        "_n" | "_N"
            | "_b"
            | "_coef"
            | "_cons"
            | "_rc"
            | "_se"
            | "_pi"
            | "_skip"
            | "_dup"
            | "_newline"
            | "_column"
            | "_continue"
            | "_request"
            | "_char"
    )
}
