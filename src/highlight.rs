//! Classify the tokens of a source file into editor highlight captures.
//!
//! Capture names follow the conventions of tree-sitter queries
//! (`comment`, `string.depth.2`, `keyword.prefix`…), so editors can map them
//! onto their themes. Only the tokenizer runs: highlighting must keep working
//! on files which don't parse.

use crate::parser::tokenizer::{make_tokenizer, SpannedToken, Token};
use crate::parser::Error;
use crate::position::BytePos;
use std::cmp::Reverse;
use std::fmt;
use std::ops::Range;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Capture {
    Comment,
    String,
    /// Compound strings, by nesting depth
    StringDepth(u8),
    /// Local macros, by nesting depth
    LocalMacro(u8),
    /// Global macros
    Variable,
    Type,
    Keyword,
    KeywordPrefix,
    Number,
    ConstantBuiltin,
    Operator,
    PunctuationBracket,
    /// Command names
    Function,
}

impl fmt::Display for Capture {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Capture::Comment => write!(f, "comment"),
            Capture::String => write!(f, "string"),
            Capture::StringDepth(depth) => write!(f, "string.depth.{}", depth),
            Capture::LocalMacro(depth) => write!(f, "variable.macro.local.depth.{}", depth),
            Capture::Variable => write!(f, "variable"),
            Capture::Type => write!(f, "type"),
            Capture::Keyword => write!(f, "keyword"),
            Capture::KeywordPrefix => write!(f, "keyword.prefix"),
            Capture::Number => write!(f, "number"),
            Capture::ConstantBuiltin => write!(f, "constant.builtin"),
            Capture::Operator => write!(f, "operator"),
            Capture::PunctuationBracket => write!(f, "punctuation.bracket"),
            Capture::Function => write!(f, "function"),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Highlight {
    pub range: Range<BytePos>,
    pub capture: Capture,
}

/// Highlights of `source`, ordered by starting position. A construct
/// enclosing others (eg. a string containing a global macro) comes first.
pub fn highlight(source: &str) -> Result<Vec<Highlight>, Error> {
    let mut highlighter = Highlighter::new();

    for token in make_tokenizer(source) {
        highlighter.token(token?);
    }

    let mut highlights = highlighter.highlights;
    highlights.sort_by_key(|h| (h.range.start, Reverse(h.range.end)));

    Ok(highlights)
}

struct Highlighter {
    highlights: Vec<Highlight>,
    /// Strings and local macros not closed yet, with their starting position
    open: Vec<(Capture, BytePos)>,
    /// Start of the global macro being read, and whether it is braced
    global: Option<(BytePos, bool)>,
    /// Start of the star comment being read
    comment: Option<BytePos>,
    /// The next identifier is a command name
    command_position: bool,
}

impl Highlighter {
    fn new() -> Highlighter {
        Highlighter {
            highlights: vec![],
            open: vec![],
            global: None,
            comment: None,
            command_position: true,
        }
    }

    fn push(&mut self, range: Range<BytePos>, capture: Capture) {
        self.highlights.push(Highlight { range, capture });
    }

    fn token(&mut self, token: SpannedToken) {
        let range = token.span.to_range();
        let at_command = self.command_position;
        self.command_position = false;

        // Structure of strings and macros, wherever they are
        match token.value {
            Token::DoubleQuote => return self.open.push((Capture::String, range.start)),
            Token::CompoundOpen(depth) => {
                return self.open.push((Capture::StringDepth(depth), range.start))
            }
            Token::LocalMacroOpen(depth) => {
                return self.open.push((Capture::LocalMacro(depth), range.start))
            }
            Token::CloseQuote | Token::CompoundClose | Token::LocalMacroClose => {
                if let Some((capture, start)) = self.open.pop() {
                    self.push(start..range.end, capture);
                }
                return;
            }
            Token::Dollar => return self.global = Some((range.start, false)),
            Token::DollarBrace => return self.global = Some((range.start, true)),
            Token::Identifier(_) if self.global.is_some() => {
                if let Some((start, false)) = self.global {
                    self.global = None;
                    self.push(start..range.end, Capture::Variable);
                }
                return;
            }
            Token::RBrace if self.global.is_some() => {
                if let Some((start, _)) = self.global.take() {
                    self.push(start..range.end, Capture::Variable);
                }
                return;
            }
            _ => (),
        }

        // The content of strings and macros is covered by their own capture
        if !self.open.is_empty() {
            return;
        }

        let capture = match token.value {
            Token::Newline => {
                self.command_position = true;
                None
            }
            Token::LineStart => {
                self.comment = Some(range.start);
                None
            }
            Token::Star if self.comment.is_some() => None,
            Token::RestOfLine(_) => {
                let start = self.comment.take().unwrap_or(range.start);
                self.push(start..range.end, Capture::Comment);
                None
            }
            Token::LineComment(_) | Token::ContinuationComment(_) | Token::BlockComment(_) => {
                Some(Capture::Comment)
            }
            Token::Program
            | Token::Define
            | Token::Subcommand(_)
            | Token::End
            | Token::Mata
            | Token::Local(_)
            | Token::Global(_)
            | Token::Temp(_)
            | Token::Control(_) => Some(Capture::Keyword),
            Token::Prefix(_) => {
                self.command_position = at_command;
                Some(Capture::KeywordPrefix)
            }
            Token::Type(_) => Some(Capture::Type),
            Token::Number(_) => Some(Capture::Number),
            Token::Missing(_) | Token::Builtin(_) => Some(Capture::ConstantBuiltin),
            Token::Operator(_) | Token::Star => Some(Capture::Operator),
            Token::RBrace => {
                // `} else {`
                self.command_position = at_command;
                Some(Capture::PunctuationBracket)
            }
            Token::LBrace
            | Token::LBracket
            | Token::RBracket
            | Token::LParen
            | Token::RParen => Some(Capture::PunctuationBracket),
            Token::Identifier(ref name) if at_command => {
                if is_control_command(name) {
                    Some(Capture::Keyword)
                } else {
                    Some(Capture::Function)
                }
            }
            _ => None,
        };

        if let Some(capture) = capture {
            self.push(range, capture);
        }
    }
}

/// Commands which are control flow, and highlighted as such
fn is_control_command(name: &str) -> bool {
    matches!(
        name,
        "if" | "else" | "foreach" | "forvalues" | "forv" | "while" | "continue" | "break"
    )
}
